//! Storage and accessors for the CPU's registers, and the Z/N/H/C flags
//! packed into the low nibble of F.

use bitflags::bitflags;

#[derive(Default)]
pub struct Registers {
    pub a: u8,
    pub flags: Flags,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,
    pub pc: u16,
}

bitflags! {
    #[derive(Default)]
    pub struct Flags: u8 {
        const Z = 0b_1000_0000;
        const N = 0b_0100_0000;
        const H = 0b_0010_0000;
        const C = 0b_0001_0000;
    }
}

#[derive(Copy, Clone)]
pub enum R8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

#[derive(Copy, Clone)]
pub enum R16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Registers {
    pub fn new() -> Registers {
        Default::default()
    }

    /// Register state immediately after the boot ROM hands off control.
    pub fn after_boot() -> Registers {
        Registers {
            a: 0x01,
            flags: Flags::Z | Flags::H | Flags::C,
            bc: 0x0013,
            de: 0x00D8,
            hl: 0x014D,
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }

    pub fn get_r8(&self, r: R8) -> u8 {
        match r {
            R8::A => self.a,
            R8::B => self.bc.to_le_bytes()[1],
            R8::C => self.bc.to_le_bytes()[0],
            R8::D => self.de.to_le_bytes()[1],
            R8::E => self.de.to_le_bytes()[0],
            R8::H => self.hl.to_le_bytes()[1],
            R8::L => self.hl.to_le_bytes()[0],
        }
    }

    pub fn set_r8(&mut self, r: R8, val: u8) {
        let r16 = match r {
            R8::A => {
                self.a = val;
                return;
            }
            R8::B | R8::C => &mut self.bc,
            R8::D | R8::E => &mut self.de,
            R8::H | R8::L => &mut self.hl,
        };

        let mut bytes = r16.to_le_bytes();
        match r {
            R8::B | R8::D | R8::H => bytes[1] = val,
            R8::C | R8::E | R8::L => bytes[0] = val,
            R8::A => unreachable!(),
        }
        *r16 = u16::from_le_bytes(bytes);
    }

    pub fn get_r16(&self, rr: R16) -> u16 {
        match rr {
            R16::AF => u16::from_le_bytes([self.flags.bits(), self.a]),
            R16::BC => self.bc,
            R16::DE => self.de,
            R16::HL => self.hl,
            R16::SP => self.sp,
            R16::PC => self.pc,
        }
    }

    pub fn set_r16(&mut self, rr: R16, val: u16) {
        match rr {
            R16::AF => {
                let bytes = val.to_le_bytes();
                self.flags = Flags::from_bits_truncate(bytes[0]);
                self.a = bytes[1];
            }
            R16::BC => self.bc = val,
            R16::DE => self.de = val,
            R16::HL => self.hl = val,
            R16::SP => self.sp = val,
            R16::PC => self.pc = val,
        }
    }

    pub fn hl(&self) -> u16 {
        self.hl
    }
    pub fn set_hl(&mut self, val: u16) {
        self.hl = val;
    }
    pub fn sp(&self) -> u16 {
        self.sp
    }
    pub fn set_sp(&mut self, val: u16) {
        self.sp = val;
    }
    pub fn pc(&self) -> u16 {
        self.pc
    }
    pub fn set_pc(&mut self, val: u16) {
        self.pc = val;
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }
    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_boot_matches_the_documented_post_boot_rom_state() {
        let reg = Registers::after_boot();

        assert_eq!(reg.get_r16(R16::AF), 0x01B0);
        assert_eq!(reg.get_r16(R16::BC), 0x0013);
        assert_eq!(reg.get_r16(R16::DE), 0x00D8);
        assert_eq!(reg.get_r16(R16::HL), 0x014D);
        assert_eq!(reg.sp(), 0xFFFE);
        assert_eq!(reg.pc(), 0x0100);
    }

    #[test]
    fn r8_and_r16_views_of_bc_agree() {
        let mut reg = Registers::new();
        reg.set_r16(R16::BC, 0xBEEF);

        assert_eq!(reg.get_r8(R8::B), 0xBE);
        assert_eq!(reg.get_r8(R8::C), 0xEF);

        reg.set_r8(R8::C, 0x00);
        assert_eq!(reg.get_r16(R16::BC), 0xBE00);
    }
}
