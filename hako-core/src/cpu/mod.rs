use std::fmt;
use std::io;

use thiserror::Error;

use crate::memory::{MemoryDevice, MemoryError, Width};
use crate::mmu::Mmu;
use crate::register::{RegisterFile, RegisterName};

pub mod decoder;
pub mod opcode;

use decoder::DecodeError;
use opcode::{Opcode, OpcodeError};

/// Everything that can stop a core in the middle of a step. None of these are retried; the
/// driving loop decides whether to halt, log or restart.
#[derive(Debug, Error)]
pub enum CpuError {
    #[error("illegal opcode 0x{opcode:02X} at 0x{address:08X}")]
    IllegalOpcode { opcode: u32, address: u32 },
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Field(#[from] OpcodeError),
    #[error("no matching bracket for the one at 0x{address:08X}")]
    UnmatchedBracket { address: u32 },
    #[error("failed to write output")]
    Output(#[from] io::Error),
}

pub type CpuResult<T> = std::result::Result<T, CpuError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepStatus {
    Running,
    Halted,
}

/// One decoded instruction, executed once against the core that fetched it.
pub trait Instruction<C: ?Sized>: fmt::Debug + fmt::Display {
    fn execute(&self, core: &mut C) -> CpuResult<StepStatus>;
}

/// A fetch-decode-execute engine bound to one register set and one [`Mmu`].
///
/// An architecture supplies its register names, the width of a raw instruction, which register
/// is the program counter, and a `decode` table from raw words to its instruction type. The
/// provided `fetch_and_decode` and `step` do the rest.
pub trait Core {
    type Register: RegisterName;
    type Instruction: Instruction<Self>;

    const INSTRUCTION_WIDTH: Width;
    const PROGRAM_COUNTER: Self::Register;

    fn state(&self) -> &RegisterFile<Self::Register>;
    fn state_mut(&mut self) -> &mut RegisterFile<Self::Register>;
    fn mmu(&self) -> &Mmu;
    fn mmu_mut(&mut self) -> &mut Mmu;

    /// Puts every register back to its power-up value.
    fn reset(&mut self);

    /// Maps a raw instruction word to an instruction. Unknown opcodes must be reported as
    /// [`DecodeError::IllegalOpcode`], never skipped.
    fn decode(opcode: Opcode) -> decoder::Result<Self::Instruction>;

    fn program_counter(&self) -> u32 {
        self.state()[Self::PROGRAM_COUNTER].read()
    }

    fn fetch_and_decode(&mut self) -> CpuResult<Self::Instruction> {
        let address = self.program_counter();
        let raw = self
            .mmu_mut()
            .load(u64::from(address), Self::INSTRUCTION_WIDTH)?;
        Self::decode(Opcode::new(raw, Self::INSTRUCTION_WIDTH)).map_err(|err| match err {
            DecodeError::IllegalOpcode(opcode) => CpuError::IllegalOpcode { opcode, address },
            DecodeError::Field(err) => CpuError::Field(err),
        })
    }

    fn step(&mut self) -> CpuResult<StepStatus> {
        let address = self.program_counter();
        let instruction = self.fetch_and_decode()?;
        tracing::trace!("0x{:08X}: {}", address, instruction);
        instruction.execute(self)
    }
}
