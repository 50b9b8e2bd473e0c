use thiserror::Error;

use crate::cpu::opcode::OpcodeError;

#[derive(Debug, Error, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DecodeError {
    #[error("illegal opcode 0x{0:02X}")]
    IllegalOpcode(u32),
    #[error(transparent)]
    Field(#[from] OpcodeError),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
