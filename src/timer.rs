//! DIV and the TIMA/TMA/TAC programmable timer. TIMA increments on falling
//! edges of a particular DIV bit (the bit selected by TAC's frequency
//! field), which is how real Game Boy hardware implements every available
//! TIMA frequency off of one free-running 16-bit divider.

use crate::address::TimerReg;
use crate::interrupt_system::{Interrupt, InterruptSystem};
use crate::util::BitOps;

pub struct Timer {
    div_reg: u16,
    tima_reg: u8,
    tma_reg: u8,
    tac_reg: u8,
    tima_freq: TimaFrequency,
    tima_enabled: bool,
}

const TAC_WRITE_MASK: u8 = 0b111;

/// Enum values are the bitmask for DIV that triggers an increase in TIMA on
/// falling edges: when the bit that is 1 in the mask goes from 1 to 0 in the
/// DIV register, TIMA is increased.
#[derive(Copy, Clone)]
#[repr(u16)]
enum TimaFrequency {
    F00 = 0b10_0000_0000,
    F01 = 0b00_0000_1000,
    F10 = 0b00_0010_0000,
    F11 = 0b00_1000_0000,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            div_reg: 0,
            tima_reg: 0,
            tma_reg: 0,
            tac_reg: !TAC_WRITE_MASK,
            tima_freq: TimaFrequency::F00,
            tima_enabled: false,
        }
    }

    /// Advances the timer by `cycles` clock cycles (a multiple of 4),
    /// updating DIV and TIMA and requesting `INT_TIMER` on overflow.
    pub fn advance(&mut self, ir_system: &mut InterruptSystem, cycles: u8) {
        let mut remaining = cycles;
        while remaining > 0 {
            let old_div = self.div_reg;
            self.div_reg = self.div_reg.wrapping_add(4);
            self.update_tima(ir_system, old_div, self.div_reg);
            remaining -= 4;
        }
    }

    pub fn read_reg(&self, reg: TimerReg) -> u8 {
        match reg {
            TimerReg::Div => (self.div_reg >> 8) as u8,
            TimerReg::Tima => self.tima_reg,
            TimerReg::Tma => self.tma_reg,
            TimerReg::Tac => self.tac_reg,
        }
    }

    pub fn write_reg(&mut self, ir_system: &mut InterruptSystem, reg: TimerReg, val: u8) {
        match reg {
            TimerReg::Div => {
                let freq_mask = self.freq_mask();
                if self.div_reg & freq_mask != 0 {
                    self.incr_tima(ir_system);
                }
                self.div_reg = 0;
            }
            TimerReg::Tima => self.tima_reg = val,
            TimerReg::Tma => self.tma_reg = val,
            TimerReg::Tac => self.write_tac(ir_system, val),
        }
    }

    fn freq_mask(&self) -> u16 {
        if self.tima_enabled {
            self.tima_freq as u16
        } else {
            0
        }
    }

    fn update_tima(&mut self, ir_system: &mut InterruptSystem, old_div: u16, new_div: u16) {
        let freq_mask = self.freq_mask();
        if old_div & freq_mask > new_div & freq_mask {
            self.incr_tima(ir_system);
        }
    }

    fn incr_tima(&mut self, ir_system: &mut InterruptSystem) {
        self.tima_reg = match self.tima_reg.checked_add(1) {
            Some(tima) => tima,
            None => {
                ir_system.schedule_interrupt(Interrupt::Timer);
                self.tma_reg
            }
        };
    }

    fn write_tac(&mut self, ir_system: &mut InterruptSystem, val: u8) {
        let new_freq = match val & 0b11 {
            0b00 => TimaFrequency::F00,
            0b01 => TimaFrequency::F01,
            0b10 => TimaFrequency::F10,
            0b11 => TimaFrequency::F11,
            _ => unreachable!(),
        };

        let was_enabled = self.tima_enabled;
        let old_freq_mask = self.freq_mask();
        self.tima_enabled = val.bit(2);
        self.tima_freq = new_freq;
        let new_freq_mask = self.freq_mask();

        // Toggling the enabled bit or changing the frequency can itself
        // cause a falling edge on the newly selected bit.
        if was_enabled != self.tima_enabled || old_freq_mask != new_freq_mask {
            if self.div_reg & old_freq_mask != 0 && self.div_reg & new_freq_mask == 0 {
                self.incr_tima(ir_system);
            }
        }

        self.tac_reg = (self.tac_reg & (!TAC_WRITE_MASK)) | (val & TAC_WRITE_MASK);
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tima_overflow_reloads_from_tma_and_requests_interrupt() {
        let mut timer = Timer::new();
        let mut ir = InterruptSystem::new();

        timer.write_reg(&mut ir, TimerReg::Tma, 0x42);
        timer.write_reg(&mut ir, TimerReg::Tac, 0x05); // enabled, freq 01 (every 16 cycles)
        timer.write_reg(&mut ir, TimerReg::Tima, 0xFF);

        timer.advance(&mut ir, 16);

        assert_eq!(timer.read_reg(TimerReg::Tima), 0x42);
        assert_eq!(ir.read_if() & (Interrupt::Timer as u8), Interrupt::Timer as u8);
    }

    #[test]
    fn div_write_resets_to_zero() {
        let mut timer = Timer::new();
        let mut ir = InterruptSystem::new();

        timer.advance(&mut ir, 40);
        assert_ne!(timer.read_reg(TimerReg::Div), 0);

        timer.write_reg(&mut ir, TimerReg::Div, 0xFF);
        assert_eq!(timer.read_reg(TimerReg::Div), 0);
    }
}
