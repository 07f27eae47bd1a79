//! Parses the fields of the cartridge header (bytes $0100-$014F) that the
//! core needs at load time.

use crate::error::CartridgeError;

pub struct Header<'a>(&'a [u8]);

impl<'a> Header<'a> {
    pub fn new(rom: &'a [u8]) -> Header<'a> {
        Header(rom)
    }

    pub fn title(&self) -> String {
        self.0[0x134..0x144]
            .iter()
            .copied()
            .take_while(|b| *b != 0)
            .map(char::from)
            .collect()
    }

    pub fn mbc_kind(&self) -> Result<MbcKind, CartridgeError> {
        let byte = self.0[0x147];
        match byte {
            0x00 => Ok(MbcKind::RomOnly),
            0x01 => Ok(MbcKind::Mbc1 { battery: false }),
            0x03 => Ok(MbcKind::Mbc1 { battery: true }),
            _ => Err(CartridgeError::UnsupportedMbcType(byte)),
        }
    }

    pub fn rom_banks(&self) -> Result<usize, CartridgeError> {
        let byte = self.0[0x148];
        match byte {
            0x00 => Ok(2),
            0x01 => Ok(4),
            0x02 => Ok(8),
            0x03 => Ok(16),
            0x04 => Ok(32),
            _ => Err(CartridgeError::UnsupportedRomSize(byte)),
        }
    }

    pub fn ram_bytes(&self) -> Result<usize, CartridgeError> {
        let byte = self.0[0x149];
        match byte {
            0x00 => Ok(0),
            0x01 => Ok(0x800),
            0x02 => Ok(0x2000),
            0x03 => Ok(0x8000),
            _ => Err(CartridgeError::UnsupportedRamSize(byte)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MbcKind {
    RomOnly,
    Mbc1 { battery: bool },
}
