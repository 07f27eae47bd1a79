//! Fetch-decode-execute for the Sharp LR35902. [`Cpu::step`] runs exactly
//! one instruction (or one idle tick while halted) and returns the number
//! of clock cycles it consumed, per the static tables below.

mod execute;
mod operands;
mod registers;

use crate::bus::Bus;
use execute::*;
use operands::{HighRamOperand, HlOperand, Imm8, ImmAddr};
pub use registers::{Flags, Registers, R16, R8};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum HaltState {
    Running,
    /// Entered by HALT; left when an enabled interrupt becomes pending.
    Halted,
    /// Entered by STOP; left on joypad activity. Since this core has no
    /// notion of "low power", STOP is treated identically to HALT.
    Stopped,
}

pub struct Cpu {
    reg: Registers,
    ime: bool,
    /// Counts down from 2 after EI; IME flips true when this hits 0, which
    /// lands after the instruction *following* EI has already executed.
    ei_delay: u8,
    halt_state: HaltState,
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            reg: Registers::after_boot(),
            ime: false,
            ei_delay: 0,
            halt_state: HaltState::Running,
        }
    }

    pub fn reg(&self) -> &Registers {
        &self.reg
    }

    /// Runs one step: either servicing a pending interrupt, idling while
    /// halted, or fetching and executing one instruction. Returns the
    /// number of cycles consumed.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u8, RuntimeError> {
        if self.ei_delay > 0 {
            self.ei_delay -= 1;
            if self.ei_delay == 0 {
                self.ime = true;
            }
        }

        if self.ime && bus.ir_system().query_interrupt_request().is_some() {
            return Ok(self.service_interrupt(bus));
        }

        if self.halt_state == HaltState::Halted || self.halt_state == HaltState::Stopped {
            if bus.ir_system().has_pending() {
                self.halt_state = HaltState::Running;
            } else {
                return Ok(4);
            }
        }

        let opcode = self.read8i(bus);

        if opcode == 0xCB {
            let cb_opcode = self.read8i(bus);
            self.execute_cb(bus, cb_opcode);
            return Ok(CB_CYCLES[cb_opcode as usize]);
        }

        let extra = self.execute(bus, opcode)?;
        Ok(CYCLES[opcode as usize] + extra)
    }

    fn service_interrupt(&mut self, bus: &mut Bus) -> u8 {
        let interrupt = bus
            .ir_system()
            .query_interrupt_request()
            .expect("caller already checked a request is pending");

        self.ime = false;
        bus.ir_system().acknowledge(interrupt);

        push(self, bus, R16::PC);
        self.reg.set_pc(interrupt.vector());

        20
    }

    fn read8i(&mut self, bus: &mut Bus) -> u8 {
        let result = bus.read8(self.reg.pc());
        self.reg.set_pc(self.reg.pc().wrapping_add(1));
        result
    }

    fn read16i(&mut self, bus: &mut Bus) -> u16 {
        let result = bus.read16(self.reg.pc());
        self.reg.set_pc(self.reg.pc().wrapping_add(2));
        result
    }

    /// Dispatches one primary opcode. Returns the extra cycles to add to
    /// the static table entry: nonzero only for conditional branches that
    /// were actually taken.
    fn execute(&mut self, bus: &mut Bus, opcode: u8) -> Result<u8, RuntimeError> {
        use HlOperand::*;
        use R16::*;
        use R8::*;

        let extra = match opcode {
            0x00 => 0, // NOP
            0x01 => { ld_rr_d16(self, bus, BC); 0 }
            0x02 => { ld8(self, bus, BC, A); 0 }
            0x03 => { inc_rr(self, bus, BC); 0 }
            0x04 => { inc8(self, bus, B); 0 }
            0x05 => { dec8(self, bus, B); 0 }
            0x06 => { ld8(self, bus, B, Imm8); 0 }
            0x07 => { rlca(self); 0 }
            0x08 => { ld_a16_sp(self, bus); 0 }
            0x09 => { add_hl_rr(self, bus, BC); 0 }
            0x0A => { ld8(self, bus, A, BC); 0 }
            0x0B => { dec_rr(self, bus, BC); 0 }
            0x0C => { inc8(self, bus, C); 0 }
            0x0D => { dec8(self, bus, C); 0 }
            0x0E => { ld8(self, bus, C, Imm8); 0 }
            0x0F => { rrca(self); 0 }

            0x10 => { self.halt_state = HaltState::Stopped; 0 }
            0x11 => { ld_rr_d16(self, bus, DE); 0 }
            0x12 => { ld8(self, bus, DE, A); 0 }
            0x13 => { inc_rr(self, bus, DE); 0 }
            0x14 => { inc8(self, bus, D); 0 }
            0x15 => { dec8(self, bus, D); 0 }
            0x16 => { ld8(self, bus, D, Imm8); 0 }
            0x17 => { rla(self); 0 }
            0x18 => { jr_cond(self, bus, true); 0 }
            0x19 => { add_hl_rr(self, bus, DE); 0 }
            0x1A => { ld8(self, bus, A, DE); 0 }
            0x1B => { dec_rr(self, bus, DE); 0 }
            0x1C => { inc8(self, bus, E); 0 }
            0x1D => { dec8(self, bus, E); 0 }
            0x1E => { ld8(self, bus, E, Imm8); 0 }
            0x1F => { rra(self); 0 }

            0x20 => if jr_cond(self, bus, !self.reg.flags().contains(Flags::Z)) { 4 } else { 0 },
            0x21 => { ld_rr_d16(self, bus, HL); 0 }
            0x22 => { ld8(self, bus, HLi, A); 0 }
            0x23 => { inc_rr(self, bus, HL); 0 }
            0x24 => { inc8(self, bus, H); 0 }
            0x25 => { dec8(self, bus, H); 0 }
            0x26 => { ld8(self, bus, H, Imm8); 0 }
            0x27 => { daa(self); 0 }
            0x28 => if jr_cond(self, bus, self.reg.flags().contains(Flags::Z)) { 4 } else { 0 },
            0x29 => { add_hl_rr(self, bus, HL); 0 }
            0x2A => { ld8(self, bus, A, HLi); 0 }
            0x2B => { dec_rr(self, bus, HL); 0 }
            0x2C => { inc8(self, bus, L); 0 }
            0x2D => { dec8(self, bus, L); 0 }
            0x2E => { ld8(self, bus, L, Imm8); 0 }
            0x2F => { cpl(self); 0 }

            0x30 => if jr_cond(self, bus, !self.reg.flags().contains(Flags::C)) { 4 } else { 0 },
            0x31 => { ld_rr_d16(self, bus, SP); 0 }
            0x32 => { ld8(self, bus, HLd, A); 0 }
            0x33 => { inc_rr(self, bus, SP); 0 }
            0x34 => { inc8(self, bus, HL); 0 }
            0x35 => { dec8(self, bus, HL); 0 }
            0x36 => { ld8(self, bus, HL, Imm8); 0 }
            0x37 => { scf(self); 0 }
            0x38 => if jr_cond(self, bus, self.reg.flags().contains(Flags::C)) { 4 } else { 0 },
            0x39 => { add_hl_rr(self, bus, SP); 0 }
            0x3A => { ld8(self, bus, A, HLd); 0 }
            0x3B => { dec_rr(self, bus, SP); 0 }
            0x3C => { inc8(self, bus, A); 0 }
            0x3D => { dec8(self, bus, A); 0 }
            0x3E => { ld8(self, bus, A, Imm8); 0 }
            0x3F => { ccf(self); 0 }

            0x40 => { ld8(self, bus, B, B); 0 }
            0x41 => { ld8(self, bus, B, C); 0 }
            0x42 => { ld8(self, bus, B, D); 0 }
            0x43 => { ld8(self, bus, B, E); 0 }
            0x44 => { ld8(self, bus, B, H); 0 }
            0x45 => { ld8(self, bus, B, L); 0 }
            0x46 => { ld8(self, bus, B, HL); 0 }
            0x47 => { ld8(self, bus, B, A); 0 }
            0x48 => { ld8(self, bus, C, B); 0 }
            0x49 => { ld8(self, bus, C, C); 0 }
            0x4A => { ld8(self, bus, C, D); 0 }
            0x4B => { ld8(self, bus, C, E); 0 }
            0x4C => { ld8(self, bus, C, H); 0 }
            0x4D => { ld8(self, bus, C, L); 0 }
            0x4E => { ld8(self, bus, C, HL); 0 }
            0x4F => { ld8(self, bus, C, A); 0 }

            0x50 => { ld8(self, bus, D, B); 0 }
            0x51 => { ld8(self, bus, D, C); 0 }
            0x52 => { ld8(self, bus, D, D); 0 }
            0x53 => { ld8(self, bus, D, E); 0 }
            0x54 => { ld8(self, bus, D, H); 0 }
            0x55 => { ld8(self, bus, D, L); 0 }
            0x56 => { ld8(self, bus, D, HL); 0 }
            0x57 => { ld8(self, bus, D, A); 0 }
            0x58 => { ld8(self, bus, E, B); 0 }
            0x59 => { ld8(self, bus, E, C); 0 }
            0x5A => { ld8(self, bus, E, D); 0 }
            0x5B => { ld8(self, bus, E, E); 0 }
            0x5C => { ld8(self, bus, E, H); 0 }
            0x5D => { ld8(self, bus, E, L); 0 }
            0x5E => { ld8(self, bus, E, HL); 0 }
            0x5F => { ld8(self, bus, E, A); 0 }

            0x60 => { ld8(self, bus, H, B); 0 }
            0x61 => { ld8(self, bus, H, C); 0 }
            0x62 => { ld8(self, bus, H, D); 0 }
            0x63 => { ld8(self, bus, H, E); 0 }
            0x64 => { ld8(self, bus, H, H); 0 }
            0x65 => { ld8(self, bus, H, L); 0 }
            0x66 => { ld8(self, bus, H, HL); 0 }
            0x67 => { ld8(self, bus, H, A); 0 }
            0x68 => { ld8(self, bus, L, B); 0 }
            0x69 => { ld8(self, bus, L, C); 0 }
            0x6A => { ld8(self, bus, L, D); 0 }
            0x6B => { ld8(self, bus, L, E); 0 }
            0x6C => { ld8(self, bus, L, H); 0 }
            0x6D => { ld8(self, bus, L, L); 0 }
            0x6E => { ld8(self, bus, L, HL); 0 }
            0x6F => { ld8(self, bus, L, A); 0 }

            0x70 => { ld8(self, bus, HL, B); 0 }
            0x71 => { ld8(self, bus, HL, C); 0 }
            0x72 => { ld8(self, bus, HL, D); 0 }
            0x73 => { ld8(self, bus, HL, E); 0 }
            0x74 => { ld8(self, bus, HL, H); 0 }
            0x75 => { ld8(self, bus, HL, L); 0 }
            0x76 => { self.halt_state = HaltState::Halted; 0 }
            0x77 => { ld8(self, bus, HL, A); 0 }
            0x78 => { ld8(self, bus, A, B); 0 }
            0x79 => { ld8(self, bus, A, C); 0 }
            0x7A => { ld8(self, bus, A, D); 0 }
            0x7B => { ld8(self, bus, A, E); 0 }
            0x7C => { ld8(self, bus, A, H); 0 }
            0x7D => { ld8(self, bus, A, L); 0 }
            0x7E => { ld8(self, bus, A, HL); 0 }
            0x7F => { ld8(self, bus, A, A); 0 }

            0x80 => { add8(self, bus, B); 0 }
            0x81 => { add8(self, bus, C); 0 }
            0x82 => { add8(self, bus, D); 0 }
            0x83 => { add8(self, bus, E); 0 }
            0x84 => { add8(self, bus, H); 0 }
            0x85 => { add8(self, bus, L); 0 }
            0x86 => { add8(self, bus, HL); 0 }
            0x87 => { add8(self, bus, A); 0 }
            0x88 => { adc8(self, bus, B); 0 }
            0x89 => { adc8(self, bus, C); 0 }
            0x8A => { adc8(self, bus, D); 0 }
            0x8B => { adc8(self, bus, E); 0 }
            0x8C => { adc8(self, bus, H); 0 }
            0x8D => { adc8(self, bus, L); 0 }
            0x8E => { adc8(self, bus, HL); 0 }
            0x8F => { adc8(self, bus, A); 0 }

            0x90 => { sub8(self, bus, B); 0 }
            0x91 => { sub8(self, bus, C); 0 }
            0x92 => { sub8(self, bus, D); 0 }
            0x93 => { sub8(self, bus, E); 0 }
            0x94 => { sub8(self, bus, H); 0 }
            0x95 => { sub8(self, bus, L); 0 }
            0x96 => { sub8(self, bus, HL); 0 }
            0x97 => { sub8(self, bus, A); 0 }
            0x98 => { sbc8(self, bus, B); 0 }
            0x99 => { sbc8(self, bus, C); 0 }
            0x9A => { sbc8(self, bus, D); 0 }
            0x9B => { sbc8(self, bus, E); 0 }
            0x9C => { sbc8(self, bus, H); 0 }
            0x9D => { sbc8(self, bus, L); 0 }
            0x9E => { sbc8(self, bus, HL); 0 }
            0x9F => { sbc8(self, bus, A); 0 }

            0xA0 => { and8(self, bus, B); 0 }
            0xA1 => { and8(self, bus, C); 0 }
            0xA2 => { and8(self, bus, D); 0 }
            0xA3 => { and8(self, bus, E); 0 }
            0xA4 => { and8(self, bus, H); 0 }
            0xA5 => { and8(self, bus, L); 0 }
            0xA6 => { and8(self, bus, HL); 0 }
            0xA7 => { and8(self, bus, A); 0 }
            0xA8 => { xor8(self, bus, B); 0 }
            0xA9 => { xor8(self, bus, C); 0 }
            0xAA => { xor8(self, bus, D); 0 }
            0xAB => { xor8(self, bus, E); 0 }
            0xAC => { xor8(self, bus, H); 0 }
            0xAD => { xor8(self, bus, L); 0 }
            0xAE => { xor8(self, bus, HL); 0 }
            0xAF => { xor8(self, bus, A); 0 }

            0xB0 => { or8(self, bus, B); 0 }
            0xB1 => { or8(self, bus, C); 0 }
            0xB2 => { or8(self, bus, D); 0 }
            0xB3 => { or8(self, bus, E); 0 }
            0xB4 => { or8(self, bus, H); 0 }
            0xB5 => { or8(self, bus, L); 0 }
            0xB6 => { or8(self, bus, HL); 0 }
            0xB7 => { or8(self, bus, A); 0 }
            0xB8 => { cp8(self, bus, B); 0 }
            0xB9 => { cp8(self, bus, C); 0 }
            0xBA => { cp8(self, bus, D); 0 }
            0xBB => { cp8(self, bus, E); 0 }
            0xBC => { cp8(self, bus, H); 0 }
            0xBD => { cp8(self, bus, L); 0 }
            0xBE => { cp8(self, bus, HL); 0 }
            0xBF => { cp8(self, bus, A); 0 }

            0xC0 => if ret_cond(self, bus, !self.reg.flags().contains(Flags::Z)) { 12 } else { 0 },
            0xC1 => { pop(self, bus, BC); 0 }
            0xC2 => if jp_cond(self, bus, !self.reg.flags().contains(Flags::Z)) { 4 } else { 0 },
            0xC3 => { jp_cond(self, bus, true); 0 }
            0xC4 => if call_cond(self, bus, !self.reg.flags().contains(Flags::Z)) { 12 } else { 0 },
            0xC5 => { push(self, bus, BC); 0 }
            0xC6 => { add8(self, bus, Imm8); 0 }
            0xC7 => { rst(self, bus, 0x00); 0 }
            0xC8 => if ret_cond(self, bus, self.reg.flags().contains(Flags::Z)) { 12 } else { 0 },
            0xC9 => { ret(self, bus, false); 0 }
            0xCA => if jp_cond(self, bus, self.reg.flags().contains(Flags::Z)) { 4 } else { 0 },
            0xCB => unreachable!("CB prefix is handled in step()"),
            0xCC => if call_cond(self, bus, self.reg.flags().contains(Flags::Z)) { 12 } else { 0 },
            0xCD => { call_cond(self, bus, true); 0 }
            0xCE => { adc8(self, bus, Imm8); 0 }
            0xCF => { rst(self, bus, 0x08); 0 }

            0xD0 => if ret_cond(self, bus, !self.reg.flags().contains(Flags::C)) { 12 } else { 0 },
            0xD1 => { pop(self, bus, DE); 0 }
            0xD2 => if jp_cond(self, bus, !self.reg.flags().contains(Flags::C)) { 4 } else { 0 },
            0xD3 => 0, // illegal, treated as NOP
            0xD4 => if call_cond(self, bus, !self.reg.flags().contains(Flags::C)) { 12 } else { 0 },
            0xD5 => { push(self, bus, DE); 0 }
            0xD6 => { sub8(self, bus, Imm8); 0 }
            0xD7 => { rst(self, bus, 0x10); 0 }
            0xD8 => if ret_cond(self, bus, self.reg.flags().contains(Flags::C)) { 12 } else { 0 },
            0xD9 => { ret(self, bus, true); 0 }
            0xDA => if jp_cond(self, bus, self.reg.flags().contains(Flags::C)) { 4 } else { 0 },
            0xDB => 0, // illegal, treated as NOP
            0xDC => if call_cond(self, bus, self.reg.flags().contains(Flags::C)) { 12 } else { 0 },
            0xDD => 0, // illegal, treated as NOP
            0xDE => { sbc8(self, bus, Imm8); 0 }
            0xDF => { rst(self, bus, 0x18); 0 }

            0xE0 => { ld8(self, bus, HighRamOperand::Imm8, A); 0 }
            0xE1 => { pop(self, bus, HL); 0 }
            0xE2 => { ld8(self, bus, HighRamOperand::C, A); 0 }
            0xE3 => 0, // illegal, treated as NOP
            0xE4 => 0, // illegal, treated as NOP
            0xE5 => { push(self, bus, HL); 0 }
            0xE6 => { and8(self, bus, Imm8); 0 }
            0xE7 => { rst(self, bus, 0x20); 0 }
            0xE8 => { add_sp_r8(self, bus); 0 }
            0xE9 => { jp_hl(self, bus); 0 }
            0xEA => { ld8(self, bus, ImmAddr, A); 0 }
            0xEB => 0, // illegal, treated as NOP
            0xEC => 0, // illegal, treated as NOP
            0xED => return Err(RuntimeError::IllegalInstruction { pc: self.reg.pc().wrapping_sub(1), opcode }),
            0xEE => { xor8(self, bus, Imm8); 0 }
            0xEF => { rst(self, bus, 0x28); 0 }

            0xF0 => { ld8(self, bus, A, HighRamOperand::Imm8); 0 }
            0xF1 => { pop_af(self, bus); 0 }
            0xF2 => { ld8(self, bus, A, HighRamOperand::C); 0 }
            0xF3 => { self.ime = false; self.ei_delay = 0; 0 }
            0xF4 => 0, // illegal, treated as NOP
            0xF5 => { push(self, bus, AF); 0 }
            0xF6 => { or8(self, bus, Imm8); 0 }
            0xF7 => { rst(self, bus, 0x30); 0 }
            0xF8 => { ld_hl_sp_r8(self, bus); 0 }
            0xF9 => { ld_sp_hl(self, bus); 0 }
            0xFA => { ld8(self, bus, A, ImmAddr); 0 }
            0xFB => { self.ei_delay = 2; 0 }
            0xFC => 0, // illegal, treated as NOP
            0xFD => 0, // illegal, treated as NOP
            0xFE => { cp8(self, bus, Imm8); 0 }
            0xFF => { rst(self, bus, 0x38); 0 }
        };

        Ok(extra)
    }

    fn execute_cb(&mut self, bus: &mut Bus, opcode: u8) {
        macro_rules! rot_group {
            ($base:expr, $func:ident) => {
                match opcode - $base {
                    0 => $func(self, bus, R8::B),
                    1 => $func(self, bus, R8::C),
                    2 => $func(self, bus, R8::D),
                    3 => $func(self, bus, R8::E),
                    4 => $func(self, bus, R8::H),
                    5 => $func(self, bus, R8::L),
                    6 => $func(self, bus, R16::HL),
                    7 => $func(self, bus, R8::A),
                    _ => unreachable!(),
                }
            };
        }

        macro_rules! bit_group {
            ($base:expr, $func:ident) => {{
                let rel = opcode - $base;
                let bit = rel / 8;
                match rel % 8 {
                    0 => $func(self, bus, bit, R8::B),
                    1 => $func(self, bus, bit, R8::C),
                    2 => $func(self, bus, bit, R8::D),
                    3 => $func(self, bus, bit, R8::E),
                    4 => $func(self, bus, bit, R8::H),
                    5 => $func(self, bus, bit, R8::L),
                    6 => $func(self, bus, bit, R16::HL),
                    7 => $func(self, bus, bit, R8::A),
                    _ => unreachable!(),
                }
            }};
        }

        match opcode {
            0x00..=0x07 => rot_group!(0x00, rlc),
            0x08..=0x0F => rot_group!(0x08, rrc),
            0x10..=0x17 => rot_group!(0x10, rl),
            0x18..=0x1F => rot_group!(0x18, rr),
            0x20..=0x27 => rot_group!(0x20, sla),
            0x28..=0x2F => rot_group!(0x28, sra),
            0x30..=0x37 => rot_group!(0x30, swap),
            0x38..=0x3F => rot_group!(0x38, srl),
            0x40..=0x7F => bit_group!(0x40, bit),
            0x80..=0xBF => bit_group!(0x80, res),
            0xC0..=0xFF => bit_group!(0xC0, set),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

pub use crate::error::RuntimeError;

#[rustfmt::skip]
const CYCLES: [u8; 256] = [
    4, 12,  8,  8,  4,  4,  8,  4, 20,  8,  8,  8,  4,  4,  8,  4, // 0x00-0x0F
    4, 12,  8,  8,  4,  4,  8,  4, 12,  8,  8,  8,  4,  4,  8,  4, // 0x10-0x1F
    8, 12,  8,  8,  4,  4,  8,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 0x20-0x2F
    8, 12,  8,  8, 12, 12, 12,  4,  8,  8,  8,  8,  4,  4,  8,  4, // 0x30-0x3F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x40-0x4F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x50-0x5F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x60-0x6F
    8,  8,  8,  8,  8,  8,  4,  8,  4,  4,  4,  4,  4,  4,  8,  4, // 0x70-0x7F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x80-0x8F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0x90-0x9F
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0xA0-0xAF
    4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  4,  4,  4,  4,  8,  4, // 0xB0-0xBF
    8, 12, 12, 16, 12, 16,  8, 16,  8, 16, 12,  0, 12, 24,  8, 16, // 0xC0-0xCF (0xCB entry unused)
    8, 12, 12,  4, 12, 16,  8, 16,  8, 16, 12,  4, 12,  4,  8, 16, // 0xD0-0xDF
   12, 12,  8,  4,  4, 16,  8, 16, 16,  4, 16,  4,  4,  4,  8, 16, // 0xE0-0xEF
   12, 12,  8,  4,  4, 16,  8, 16, 12,  8, 16,  4,  4,  4,  8, 16, // 0xF0-0xFF
];

#[rustfmt::skip]
const CB_CYCLES: [u8; 256] = [
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RLC, RRC
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RL, RR
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SLA, SRA
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SWAP, SRL
    8, 8, 8, 8, 8, 8, 12, 8,  8, 8, 8, 8, 8, 8, 12, 8, // BIT 0,1
    8, 8, 8, 8, 8, 8, 12, 8,  8, 8, 8, 8, 8, 8, 12, 8, // BIT 2,3
    8, 8, 8, 8, 8, 8, 12, 8,  8, 8, 8, 8, 8, 8, 12, 8, // BIT 4,5
    8, 8, 8, 8, 8, 8, 12, 8,  8, 8, 8, 8, 8, 8, 12, 8, // BIT 6,7
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RES 0,1
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RES 2,3
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RES 4,5
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // RES 6,7
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SET 0,1
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SET 2,3
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SET 4,5
    8, 8, 8, 8, 8, 8, 16, 8,  8, 8, 8, 8, 8, 8, 16, 8, // SET 6,7
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt_system::Interrupt;

    /// A ROM_ONLY, RAM-less, 32 KiB cartridge with `program` placed at
    /// $0100, where [`Registers::after_boot`] starts PC.
    fn bus_with_program(program: &[u8]) -> Bus {
        let mut rom = vec![0u8; 0x8000];
        rom[0x147] = 0x00;
        rom[0x148] = 0x00;
        rom[0x149] = 0x00;
        rom[0x100..0x100 + program.len()].copy_from_slice(program);
        Bus::new(rom).unwrap()
    }

    #[test]
    fn add_sets_half_carry_at_the_nibble_boundary() {
        let mut bus = bus_with_program(&[0x3E, 0x0F, 0xC6, 0x01]); // LD A,$0F; ADD A,$01
        let mut cpu = Cpu::new();
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.reg().get_r8(R8::A), 0x10);
        assert!(cpu.reg().flags().contains(Flags::H));
        assert!(!cpu.reg().flags().intersects(Flags::Z | Flags::N | Flags::C));
    }

    #[test]
    fn push_pop_round_trips_a_register_pair() {
        let mut bus = bus_with_program(&[0x01, 0x34, 0x12, 0xC5, 0xD1]); // LD BC,$1234; PUSH BC; POP DE
        let mut cpu = Cpu::new();
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
        }

        assert_eq!(cpu.reg().get_r16(R16::DE), 0x1234);
    }

    #[test]
    fn eight_rotations_are_the_identity() {
        let mut program = vec![0x06, 0xB1]; // LD B,$B1
        for _ in 0..8 {
            program.extend_from_slice(&[0xCB, 0x00]); // RLC B
        }
        let mut bus = bus_with_program(&program);
        let mut cpu = Cpu::new();

        for _ in 0..9 {
            cpu.step(&mut bus).unwrap();
        }

        assert_eq!(cpu.reg().get_r8(R8::B), 0xB1);
    }

    #[test]
    fn swap_is_its_own_inverse() {
        let mut bus = bus_with_program(&[0x06, 0xA5, 0xCB, 0x30, 0xCB, 0x30]); // LD B,$A5; SWAP B; SWAP B
        let mut cpu = Cpu::new();
        for _ in 0..3 {
            cpu.step(&mut bus).unwrap();
        }

        assert_eq!(cpu.reg().get_r8(R8::B), 0xA5);
    }

    #[test]
    fn sub_a_a_yields_zero_with_z_and_n_set() {
        let mut bus = bus_with_program(&[0x3E, 0x05, 0x97]); // LD A,$05; SUB A,A
        let mut cpu = Cpu::new();
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.reg().get_r8(R8::A), 0);
        assert!(cpu.reg().flags().contains(Flags::Z | Flags::N));
        assert!(!cpu.reg().flags().intersects(Flags::H | Flags::C));
    }

    #[test]
    fn xor_a_a_clears_every_flag() {
        let mut bus = bus_with_program(&[0x3E, 0x05, 0xAF]); // LD A,$05; XOR A,A
        let mut cpu = Cpu::new();
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();

        assert_eq!(cpu.reg().get_r8(R8::A), 0);
        assert!(cpu.reg().flags().contains(Flags::Z));
        assert!(!cpu.reg().flags().intersects(Flags::N | Flags::H | Flags::C));
    }

    #[test]
    fn documented_illegal_opcode_runs_as_a_zero_cost_nop() {
        let mut bus = bus_with_program(&[0xD3]);
        let mut cpu = Cpu::new();
        let cycles = cpu.step(&mut bus).unwrap();

        assert_eq!(cycles, CYCLES[0xD3]);
        assert_eq!(cpu.reg().pc(), 0x101);
    }

    #[test]
    fn undefined_opcode_surfaces_as_an_error() {
        let mut bus = bus_with_program(&[0xED]);
        let mut cpu = Cpu::new();

        let err = cpu.step(&mut bus).unwrap_err();
        assert_eq!(err, RuntimeError::IllegalInstruction { pc: 0x100, opcode: 0xED });
    }

    #[test]
    fn ei_enables_interrupts_only_after_the_following_instruction() {
        let mut bus = bus_with_program(&[0xFB, 0x00, 0x00]); // EI; NOP; NOP
        bus.write8(0xFFFF, Interrupt::Timer as u8);
        bus.ir_system().schedule_interrupt(Interrupt::Timer);
        let mut cpu = Cpu::new();

        cpu.step(&mut bus).unwrap(); // EI itself
        assert_eq!(cpu.reg().pc(), 0x101);

        cpu.step(&mut bus).unwrap(); // the instruction right after EI still runs
        assert_eq!(cpu.reg().pc(), 0x102);

        let cycles = cpu.step(&mut bus).unwrap(); // now the pending interrupt preempts the 2nd NOP
        assert_eq!(cycles, 20);
        assert_eq!(cpu.reg().pc(), Interrupt::Timer.vector());
        assert_eq!(bus.read16(cpu.reg().sp()), 0x102);
    }

    #[test]
    fn halt_exits_on_pending_interrupt_even_with_ime_disabled() {
        let mut bus = bus_with_program(&[0x76, 0x00]); // HALT; NOP
        let mut cpu = Cpu::new();

        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.reg().pc(), 0x101);

        let idle_cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(idle_cycles, 4);
        assert_eq!(cpu.reg().pc(), 0x101); // still halted, nothing pending yet

        bus.write8(0xFFFF, Interrupt::Timer as u8);
        bus.ir_system().schedule_interrupt(Interrupt::Timer);

        cpu.step(&mut bus).unwrap(); // resumes and runs the NOP; no vector taken since IME=0
        assert_eq!(cpu.reg().pc(), 0x102);
    }
}
