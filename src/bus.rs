//! The memory-mapped bus: decodes every CPU/DMA access via [`Addr`] and
//! routes it to the component that owns that region. This is also where
//! timers, the LCD, and interrupts are advanced in lock-step with the CPU.

use crate::address::{Addr, IoReg, PpuReg, TimerReg};
use crate::cartridge::Cartridge;
use crate::error::CartridgeError;
use crate::interrupt_system::InterruptSystem;
use crate::joypad::{JoyPad, Key};
use crate::ppu::{FrameStatus, Ppu};
use crate::serial_port::SerialPort;
use crate::timer::Timer;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;
const OAM_DMA_LEN: u16 = 0xA0;

pub struct Bus {
    cartridge: Cartridge,
    ppu: Ppu,
    wram: Box<[u8]>,
    hram: Box<[u8]>,
    ir_system: InterruptSystem,
    timer: Timer,
    joypad: JoyPad,
    serial: SerialPort,
    /// Backing store for registers the core accepts but does not act on:
    /// the sound channels, wave RAM, and KEY1.
    unimplemented_io: [u8; 0x80],
}

impl Bus {
    pub fn new(rom: Vec<u8>) -> Result<Bus, CartridgeError> {
        Ok(Bus {
            cartridge: Cartridge::new(rom)?,
            ppu: Ppu::new(),
            wram: vec![0; WRAM_SIZE].into_boxed_slice(),
            hram: vec![0; HRAM_SIZE].into_boxed_slice(),
            ir_system: InterruptSystem::new(),
            timer: Timer::new(),
            joypad: JoyPad::new(),
            serial: SerialPort::new(),
            unimplemented_io: [0; 0x80],
        })
    }

    pub fn read8(&self, addr: u16) -> u8 {
        match Addr::from(addr) {
            Addr::CRom(offset) => self.cartridge.read_rom(offset),
            Addr::VRam(offset) => self.ppu.read_vram(offset),
            Addr::CRam(offset) => self.cartridge.read_ram(offset),
            Addr::WRam(offset) => self.wram[offset as usize],
            Addr::Oam(offset) => self.ppu.read_oam(offset),
            Addr::Unusable => 0,
            Addr::Io(reg) => self.read_io(reg),
            Addr::HRam(offset) => self.hram[offset as usize],
            Addr::Ie => self.ir_system.read_ie(),
        }
    }

    pub fn write8(&mut self, addr: u16, val: u8) {
        match Addr::from(addr) {
            Addr::CRom(offset) => self.cartridge.write_rom(offset, val),
            Addr::VRam(offset) => self.ppu.write_vram(offset, val),
            Addr::CRam(offset) => self.cartridge.write_ram(offset, val),
            Addr::WRam(offset) => self.wram[offset as usize] = val,
            Addr::Oam(offset) => self.ppu.write_oam(offset, val),
            Addr::Unusable => (),
            Addr::Io(reg) => self.write_io(reg, val),
            Addr::HRam(offset) => self.hram[offset as usize] = val,
            Addr::Ie => self.ir_system.write_ie(val),
        }
    }

    pub fn read16(&self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write16(&mut self, addr: u16, val: u16) {
        let bytes = val.to_le_bytes();
        self.write8(addr, bytes[0]);
        self.write8(addr.wrapping_add(1), bytes[1]);
    }

    fn read_io(&self, reg: IoReg) -> u8 {
        match reg {
            IoReg::P1 => self.joypad.read_p1(),
            IoReg::Serial(r) => self.serial.read_reg(r),
            IoReg::Timer(r) => self.timer.read_reg(r),
            IoReg::If => self.ir_system.read_if(),
            IoReg::Ppu(r) => self.read_ppu_reg(r),
            IoReg::Apu(addr) => self.unimplemented_io[(addr & 0x7F) as usize],
            IoReg::Key1 => self.unimplemented_io[(0xFF4D & 0x7F) as usize],
            IoReg::Unimplemented(addr) => self.unimplemented_io[(addr & 0x7F) as usize],
        }
    }

    fn write_io(&mut self, reg: IoReg, val: u8) {
        match reg {
            IoReg::P1 => self.joypad.write_p1(val),
            IoReg::Serial(r) => self.serial.write_reg(r, val),
            IoReg::Timer(r) => self.timer.write_reg(&mut self.ir_system, r, val),
            IoReg::If => self.ir_system.write_if(val),
            IoReg::Ppu(PpuReg::Dma) => self.run_oam_dma(val),
            IoReg::Ppu(r) => self.write_ppu_reg(r, val),
            IoReg::Apu(addr) => self.unimplemented_io[(addr & 0x7F) as usize] = val,
            IoReg::Key1 => self.unimplemented_io[(0xFF4D & 0x7F) as usize] = val,
            IoReg::Unimplemented(addr) => self.unimplemented_io[(addr & 0x7F) as usize] = val,
        }
    }

    fn read_ppu_reg(&self, reg: PpuReg) -> u8 {
        match reg {
            PpuReg::Lcdc => self.ppu.read_lcdc(),
            PpuReg::Stat => self.ppu.read_stat(),
            PpuReg::Scy => self.ppu.scy(),
            PpuReg::Scx => self.ppu.scx(),
            PpuReg::Ly => self.ppu.ly(),
            PpuReg::Lyc => self.ppu.lyc(),
            PpuReg::Dma => 0xFF,
            PpuReg::Bgp => self.ppu.bgp(),
            PpuReg::Obp0 => self.ppu.obp0(),
            PpuReg::Obp1 => self.ppu.obp1(),
            PpuReg::Wy => self.ppu.wy(),
            PpuReg::Wx => self.ppu.wx(),
        }
    }

    fn write_ppu_reg(&mut self, reg: PpuReg, val: u8) {
        match reg {
            PpuReg::Lcdc => self.ppu.write_lcdc(val),
            PpuReg::Stat => self.ppu.write_stat(val),
            PpuReg::Scy => self.ppu.set_scy(val),
            PpuReg::Scx => self.ppu.set_scx(val),
            PpuReg::Ly => self.ppu.reset_ly(),
            PpuReg::Lyc => self.ppu.set_lyc(val),
            PpuReg::Dma => self.run_oam_dma(val),
            PpuReg::Bgp => self.ppu.set_bgp(val),
            PpuReg::Obp0 => self.ppu.set_obp0(val),
            PpuReg::Obp1 => self.ppu.set_obp1(val),
            PpuReg::Wy => self.ppu.set_wy(val),
            PpuReg::Wx => self.ppu.set_wx(val),
        }
    }

    /// Modeled as instantaneous: real hardware locks out non-HRAM bus access
    /// for 160 cycles during the transfer, which this core does not enforce.
    fn run_oam_dma(&mut self, val: u8) {
        let src_base = (val as u16) << 8;
        for i in 0..OAM_DMA_LEN {
            let byte = self.read8(src_base + i);
            self.ppu.write_oam(i, byte);
        }
    }

    /// Advances timers, the LCD, and the completed-frame state by `cycles`.
    pub fn advance(&mut self, cycles: u8, frame_buffer: &mut [u32]) -> FrameStatus {
        self.timer.advance(&mut self.ir_system, cycles);
        self.ppu.advance(&mut self.ir_system, cycles, frame_buffer)
    }

    pub fn ir_system(&mut self) -> &mut InterruptSystem {
        &mut self.ir_system
    }

    pub fn set_key(&mut self, key: Key, pressed: bool) {
        self.joypad.set_key(&mut self.ir_system, key, pressed);
    }

    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.cartridge.battery_ram()
    }

    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.cartridge.load_battery_ram(data);
    }
}
