//! Storage for the serial port registers (SB/SC). Actual link-cable transfer
//! is out of scope; writes are accepted and stored so games that poll the
//! registers without a link partner attached don't get stuck.

use crate::address::SerialReg;

pub struct SerialPort {
    sb_reg: u8,
    sc_reg: u8,
}

impl SerialPort {
    pub fn new() -> SerialPort {
        SerialPort {
            sb_reg: 0,
            sc_reg: 0x7E,
        }
    }

    pub fn write_reg(&mut self, reg: SerialReg, val: u8) {
        match reg {
            SerialReg::Sb => self.sb_reg = val,
            SerialReg::Sc => {
                // This is logged as `info`, not `warn`, because some games poll it constantly
                log::info!("serial transfer requested (SC={:#04X}), no link partner attached", val);
                self.sc_reg = val;
            }
        }
    }

    pub fn read_reg(&self, reg: SerialReg) -> u8 {
        match reg {
            SerialReg::Sb => self.sb_reg,
            SerialReg::Sc => self.sc_reg,
        }
    }
}

impl Default for SerialPort {
    fn default() -> Self {
        Self::new()
    }
}
