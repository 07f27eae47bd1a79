//! A cycle-stepped emulation core for the original Game Boy (DMG) CPU, PPU,
//! timer, joypad, and serial port. The core owns all hardware state; the
//! host drives it one frame at a time via [`GameBoy::step_frame`] and is
//! responsible for everything outside the console itself: windowing, audio
//! output, input capture, and loading the ROM file from disk.

mod address;
mod bus;
mod cartridge;
mod cpu;
mod error;
mod interrupt_system;
mod joypad;
mod ppu;
mod serial_port;
mod timer;
mod util;

use bus::Bus;
use cpu::Cpu;

pub use error::{CartridgeError, RuntimeError};
pub use joypad::Key;
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Total clock cycles in one 59.7 Hz frame: 154 scanlines * 456 cycles.
const CYCLES_PER_FRAME: u32 = 70224;

/// A fully self-contained Game Boy: CPU, memory bus, and every peripheral
/// hung off it. Construct one per loaded ROM.
pub struct GameBoy {
    cpu: Cpu,
    bus: Bus,
}

/// Bookkeeping returned from a completed [`GameBoy::step_frame`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    /// Clock cycles actually consumed to reach the frame boundary. At least
    /// `CYCLES_PER_FRAME`; may run slightly over since an instruction is
    /// never interrupted mid-execution.
    pub cycles_run: u32,
}

impl GameBoy {
    /// Parses `rom`'s header and constructs a console in its post-boot-ROM
    /// state (registers, stack pointer, and LCDC/BGP already set up as if
    /// the real boot ROM had just handed off control to $0100).
    pub fn new(rom: Vec<u8>) -> Result<GameBoy, CartridgeError> {
        Ok(GameBoy {
            cpu: Cpu::new(),
            bus: Bus::new(rom)?,
        })
    }

    /// Runs the CPU, timer, and LCD in lock-step until at least
    /// `CYCLES_PER_FRAME` cycles have elapsed and the LCD has wrapped past
    /// line 153. `frame_buffer` is overwritten scanline by scanline as the
    /// LCD rasterizes; by the time this returns it holds the completed
    /// frame as packed-u32 shades (0 = lightest, 3 = darkest).
    pub fn step_frame(
        &mut self,
        frame_buffer: &mut [u32; SCREEN_WIDTH * SCREEN_HEIGHT],
    ) -> Result<FrameInfo, RuntimeError> {
        let mut cycles_run = 0;

        while cycles_run < CYCLES_PER_FRAME {
            let cycles = self.cpu.step(&mut self.bus)?;
            self.bus.advance(cycles, frame_buffer);
            cycles_run += cycles as u32;
        }

        Ok(FrameInfo { cycles_run })
    }

    /// Updates one button's held state. Transitioning a key from released
    /// to pressed while its group (direction/action) is the one currently
    /// selected on JOYP raises the joypad interrupt.
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.bus.set_key(key, pressed);
    }

    /// External RAM contents, for battery-backed cartridges only.
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.bus.battery_ram()
    }

    /// Restores previously saved external RAM. `data` is copied in up to
    /// the length of the cartridge's actual RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.bus.load_battery_ram(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_program(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x00; // ROM_ONLY
        rom[0x148] = 0x00; // 2 banks
        rom[0x149] = 0x00; // no RAM
        rom[0x100..0x100 + program.len()].copy_from_slice(program);
        rom
    }

    #[test]
    fn step_frame_runs_at_least_one_frames_worth_of_cycles() {
        #[rustfmt::skip]
        let program = [
            0x18, 0xFE, // JR -2 (spin forever)
        ];
        let mut gb = GameBoy::new(rom_with_program(&program)).unwrap();
        let mut frame_buffer = [0u32; SCREEN_WIDTH * SCREEN_HEIGHT];

        let info = gb.step_frame(&mut frame_buffer).unwrap();

        assert!(info.cycles_run >= CYCLES_PER_FRAME);
    }

    /// Drives a ROM that enables the LCD and sprites, DMAs a single sprite
    /// into OAM from work RAM, then spins for the rest of the frame. The
    /// background is left at its post-boot all-zero VRAM (lightest shade),
    /// so a rendered, non-transparent sprite pixel is distinguishable from
    /// the background by color alone.
    #[test]
    fn oam_dma_makes_a_sprite_appear_in_the_rendered_frame() {
        #[rustfmt::skip]
        let program = [
            0x3E, 0x93,       // LD A,$93      ; LCD+BG+sprites on, tile data @ $8000
            0xE0, 0x40,       // LDH ($40),A

            0x21, 0x10, 0x80, // LD HL,$8010   ; sprite tile 1, row 0
            0x36, 0x7F,       // LD (HL),$7F   ; pixel 0 transparent, pixels 1-7 opaque
            0x23,             // INC HL
            0x36, 0x00,       // LD (HL),$00

            0x21, 0x00, 0xC0, // LD HL,$C000   ; OAM entry staged in work RAM
            0x36, 0x10,       // LD (HL),16    ; y
            0x23,             // INC HL
            0x36, 0x08,       // LD (HL),8     ; x
            0x23,             // INC HL
            0x36, 0x01,       // LD (HL),1     ; tile index
            0x23,             // INC HL
            0x36, 0x00,       // LD (HL),0     ; attributes

            0x3E, 0xC0,       // LD A,$C0
            0xE0, 0x46,       // LDH ($46),A   ; trigger OAM DMA from $C000

            0x18, 0xFE,       // JR -2         ; spin for the rest of the frame
        ];
        let mut gb = GameBoy::new(rom_with_program(&program)).unwrap();
        let mut frame_buffer = [0u32; SCREEN_WIDTH * SCREEN_HEIGHT];

        gb.step_frame(&mut frame_buffer).unwrap();

        assert_eq!(frame_buffer[0], 0xFFFFFFFF); // sprite pixel 0 transparent, bg shows through
        assert_eq!(frame_buffer[1], 0x000000FF); // sprite pixel 1 opaque
    }

    #[test]
    fn battery_ram_round_trips_across_a_fresh_instance() {
        let mut rom = rom_with_program(&[0x18, 0xFE]);
        rom[0x147] = 0x03; // MBC1+RAM+BATTERY
        rom[0x148] = 0x00;
        rom[0x149] = 0x02; // 8 KiB RAM

        let mut gb = GameBoy::new(rom.clone()).unwrap();
        let saved = vec![0x42; 0x2000];
        gb.load_battery_ram(&saved);

        assert_eq!(gb.battery_ram().unwrap(), &saved[..]);
    }
}
