//! This module is responsible for any kind of user input through the buttons
//! on the Game Boy. It is the one piece of core state a host is expected to
//! mutate directly, via [`JoyPad::set_key`].

use crate::interrupt_system::{Interrupt, InterruptSystem};
use bitflags::bitflags;

/// A single Game Boy button, as exposed to the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Key {
    fn mask(self) -> Buttons {
        match self {
            Key::Right => Buttons::RIGHT,
            Key::Left => Buttons::LEFT,
            Key::Up => Buttons::UP,
            Key::Down => Buttons::DOWN,
            Key::A => Buttons::A,
            Key::B => Buttons::B,
            Key::Select => Buttons::SELECT,
            Key::Start => Buttons::START,
        }
    }

    /// Whether this key belongs to the direction group or the action
    /// (general) group of the JOYP matrix.
    fn is_directional(self) -> bool {
        match self {
            Key::Right | Key::Left | Key::Up | Key::Down => true,
            Key::A | Key::B | Key::Select | Key::Start => false,
        }
    }
}

/// Storage for the P1/JOYP register and the states of all buttons
pub struct JoyPad {
    /// aka JOYP
    p1_reg: u8,
    /// Bitflags of *all* buttons pressed, with `0 <=> pressed` and `1 <=> released`. The lower
    /// 4 bits are used for the directional buttons, the upper 4 bits for the rest.
    pressed: Buttons,
    /// Which group of buttons is currently mapped to the P1 register
    active_buttons: ActiveButtonGroup,
}

enum ActiveButtonGroup {
    Neither,
    Directional,
    General,
    Both,
}

bitflags! {
    /// Flags for button state, where `current_state |= RIGHT` means that
    /// the right D-pad key has been *released*, and `current_state &= !RIGHT` means
    /// that the key has been pressed (so 0 means pressed, 1 means released).
    pub struct Buttons: u8 {
        const RIGHT = 0b_0000_0001;
        const LEFT = 0b_0000_0010;
        const UP = 0b_0000_0100;
        const DOWN = 0b_0000_1000;
        const A = 0b_0001_0000;
        const B = 0b_0010_0000;
        const SELECT = 0b_0100_0000;
        const START = 0b_1000_0000;
    }
}

/// The write-mask of the P1 register
const P1_MASK: u8 = 0b_0011_0000;

impl JoyPad {
    pub fn new() -> JoyPad {
        JoyPad {
            p1_reg: 0xff,
            pressed: Buttons::all(),
            active_buttons: ActiveButtonGroup::Neither,
        }
    }

    pub fn read_p1(&self) -> u8 {
        (self.p1_reg & 0xf0)
            | match self.active_buttons {
                ActiveButtonGroup::Neither => 0,
                ActiveButtonGroup::Directional => self.pressed.bits() & 0x0f,
                ActiveButtonGroup::General => self.pressed.bits() >> 4,
                ActiveButtonGroup::Both => {
                    (self.pressed.bits() & 0x0f) | (self.pressed.bits() >> 4)
                }
            }
    }

    pub fn write_p1(&mut self, val: u8) {
        self.p1_reg = (self.p1_reg & (!P1_MASK)) | (val & P1_MASK);

        self.active_buttons = match self.p1_reg & 0b_0011_0000 {
            0b_0000_0000 => ActiveButtonGroup::Both,
            0b_0001_0000 => ActiveButtonGroup::General,
            0b_0010_0000 => ActiveButtonGroup::Directional,
            0b_0011_0000 => ActiveButtonGroup::Neither,
            _ => unreachable!(),
        }
    }

    /// See documentation at [`crate::GameBoy::set_key`]
    pub fn set_key(&mut self, ir_system: &mut InterruptSystem, key: Key, pressed: bool) {
        let mask = key.mask();

        if pressed {
            // A key transitioning released -> pressed while its bit is
            // currently 1 (released) requests the interrupt, but only if
            // the key's group (direction/action) is the one selected on P1.
            let group_selected = match self.active_buttons {
                ActiveButtonGroup::Both => true,
                ActiveButtonGroup::Directional => key.is_directional(),
                ActiveButtonGroup::General => !key.is_directional(),
                ActiveButtonGroup::Neither => false,
            };
            if self.pressed.contains(mask) && group_selected {
                ir_system.schedule_interrupt(Interrupt::Joypad);
            }
            self.pressed.remove(mask);
        } else {
            self.pressed.insert(mask);
        }
    }
}

impl Default for JoyPad {
    fn default() -> Self {
        Self::new()
    }
}
