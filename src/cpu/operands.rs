//! [`Src8`]/[`Dst8`] generalize over the many places an opcode's operand can
//! live (a register, (HL), an immediate, a high-RAM short address) so the
//! operation functions in [`super::execute`] don't need one variant per
//! addressing mode.

use super::registers::{R16, R8};
use super::Cpu;
use crate::bus::Bus;

pub trait Src8 {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8;
}

pub trait Dst8 {
    fn write(self, cpu: &mut Cpu, bus: &mut Bus, val: u8);
}

/// Reads (HL) and then increments/decrements HL, e.g. for `LD A,(HL+)`.
#[derive(Copy, Clone)]
pub enum HlOperand {
    HLi,
    HLd,
}

impl Src8 for HlOperand {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8 {
        let addr = cpu.reg.hl();
        let val = bus.read8(addr);
        cpu.reg.set_hl(match self {
            HlOperand::HLi => addr.wrapping_add(1),
            HlOperand::HLd => addr.wrapping_sub(1),
        });
        val
    }
}

impl Dst8 for HlOperand {
    fn write(self, cpu: &mut Cpu, bus: &mut Bus, val: u8) {
        let addr = cpu.reg.hl();
        bus.write8(addr, val);
        cpu.reg.set_hl(match self {
            HlOperand::HLi => addr.wrapping_add(1),
            HlOperand::HLd => addr.wrapping_sub(1),
        });
    }
}

/// Reads an immediate byte from (PC), advancing PC past it.
pub struct Imm8;

impl Src8 for Imm8 {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8 {
        cpu.read8i(bus)
    }
}

/// `LDH` forms: the target address is always 0xFF00 + an 8 bit offset,
/// either an immediate or the value of C.
#[derive(Copy, Clone)]
pub enum HighRamOperand {
    Imm8,
    C,
}

impl HighRamOperand {
    fn addr(self, cpu: &mut Cpu, bus: &mut Bus) -> u16 {
        let offset = match self {
            HighRamOperand::Imm8 => cpu.read8i(bus) as u16,
            HighRamOperand::C => cpu.reg.get_r8(R8::C) as u16,
        };
        0xFF00 + offset
    }
}

impl Src8 for HighRamOperand {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8 {
        let addr = self.addr(cpu, bus);
        bus.read8(addr)
    }
}

impl Dst8 for HighRamOperand {
    fn write(self, cpu: &mut Cpu, bus: &mut Bus, val: u8) {
        let addr = self.addr(cpu, bus);
        bus.write8(addr, val);
    }
}

impl Src8 for R8 {
    fn read(self, cpu: &mut Cpu, _bus: &mut Bus) -> u8 {
        cpu.reg.get_r8(self)
    }
}

impl Dst8 for R8 {
    fn write(self, cpu: &mut Cpu, _bus: &mut Bus, val: u8) {
        cpu.reg.set_r8(self, val);
    }
}

/// `(BC)`/`(DE)`/`(HL)` as a plain, non-autoincrementing memory operand.
impl Src8 for R16 {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8 {
        bus.read8(cpu.reg.get_r16(self))
    }
}

impl Dst8 for R16 {
    fn write(self, cpu: &mut Cpu, bus: &mut Bus, val: u8) {
        bus.write8(cpu.reg.get_r16(self), val);
    }
}

/// Reads a 16 bit immediate address from (PC) and accesses the byte there.
pub struct ImmAddr;

impl Src8 for ImmAddr {
    fn read(self, cpu: &mut Cpu, bus: &mut Bus) -> u8 {
        let addr = cpu.read16i(bus);
        bus.read8(addr)
    }
}

impl Dst8 for ImmAddr {
    fn write(self, cpu: &mut Cpu, bus: &mut Bus, val: u8) {
        let addr = cpu.read16i(bus);
        bus.write8(addr, val);
    }
}
