//! Typed errors surfaced by the core. Every failure mode named in the
//! constructor and the step loop has a variant here; there is no recovery
//! path inside the core itself, only reporting.

use thiserror::Error;

/// Cartridge header fields that make a ROM unsupported by this core.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM is {0} bytes, which is smaller than the minimum 32 KiB")]
    RomTooSmall(usize),

    #[error("unsupported MBC type byte {0:#04X} at $0147")]
    UnsupportedMbcType(u8),

    #[error("unsupported ROM size code {0:#04X} at $0148")]
    UnsupportedRomSize(u8),

    #[error("unsupported RAM size code {0:#04X} at $0149")]
    UnsupportedRamSize(u8),
}

/// Errors that can surface from [`crate::GameBoy::step_frame`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("illegal instruction {opcode:#04X} at PC={pc:#06X}")]
    IllegalInstruction { pc: u16, opcode: u8 },
}
