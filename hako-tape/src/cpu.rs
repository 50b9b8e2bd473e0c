use std::fmt;
use std::io::{self, Write};

use hako_core::cpu::decoder::{self, DecodeError};
use hako_core::cpu::opcode::Opcode;
use hako_core::{Core, CpuError, CpuResult, MemoryDevice, MemoryError, Mmu, RegisterFile, Width};

use crate::instructions::TapeInstruction;

hako_core::register_set! {
    /// Data pointer and program counter; nothing else is architecturally visible.
    pub enum TapeRegister { DP, PC }
}

pub const DP_RESET_VALUE: u32 = 0x800;
pub const PC_RESET_VALUE: u32 = 0;

/// A tape machine core: one-byte instructions fetched from `PC`, operating on the byte at `DP`.
///
/// Bytes printed by `.` go to `output`, which is flushed after every byte.
pub struct TapeCore<W: Write = io::Stdout> {
    mmu: Mmu,
    state: RegisterFile<TapeRegister>,
    output: W,
}

impl<W: Write> fmt::Debug for TapeCore<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapeCore")
            .field("mmu", &self.mmu)
            .field("state", &self.state)
            .finish()
    }
}

impl TapeCore {
    pub fn new(mmu: Mmu) -> Self {
        Self::with_output(mmu, io::stdout())
    }
}

impl<W: Write> TapeCore<W> {
    pub fn with_output(mmu: Mmu, output: W) -> Self {
        let mut core = Self {
            mmu,
            state: RegisterFile::new(),
            output,
        };
        core.reset();
        core
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub(crate) fn data_pointer(&self) -> u64 {
        u64::from(self.state[TapeRegister::DP].read())
    }

    pub(crate) fn emit(&mut self, byte: u8) -> CpuResult<()> {
        self.output.write_all(&[byte])?;
        self.output.flush()?;
        Ok(())
    }

    /// Distance from `PC` forward to the `]` matching the `[` at `PC`.
    pub fn find_matched_close_bracket(&mut self) -> CpuResult<u32> {
        let start = self.program_counter();
        self.scan_for_match(start, |offset| start.checked_add(offset), b'[', b']')
    }

    /// Distance from `PC` back to the `[` matching the `]` at `PC`.
    pub fn find_matched_open_bracket(&mut self) -> CpuResult<u32> {
        let start = self.program_counter();
        self.scan_for_match(start, |offset| start.checked_sub(offset), b']', b'[')
    }

    fn scan_for_match(
        &mut self,
        start: u32,
        address_at: impl Fn(u32) -> Option<u32>,
        nest: u8,
        unnest: u8,
    ) -> CpuResult<u32> {
        let unmatched = CpuError::UnmatchedBracket { address: start };
        let mut depth = 1;
        let mut offset = 0;
        while depth > 0 {
            offset += 1;
            let address = match address_at(offset) {
                Some(address) => address,
                None => return Err(unmatched),
            };
            let byte = match self.mmu.load8(u64::from(address)) {
                Ok(byte) => byte,
                Err(MemoryError::UnmappedAddress(_)) => return Err(unmatched),
                Err(err) => return Err(err.into()),
            };
            if byte == u32::from(nest) {
                depth += 1;
            } else if byte == u32::from(unnest) {
                depth -= 1;
            }
        }
        Ok(offset)
    }
}

impl<W: Write> Core for TapeCore<W> {
    type Register = TapeRegister;
    type Instruction = TapeInstruction;

    const INSTRUCTION_WIDTH: Width = Width::Byte;
    const PROGRAM_COUNTER: TapeRegister = TapeRegister::PC;

    fn state(&self) -> &RegisterFile<TapeRegister> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RegisterFile<TapeRegister> {
        &mut self.state
    }

    fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    fn reset(&mut self) {
        self.state.reset([
            (TapeRegister::DP, DP_RESET_VALUE),
            (TapeRegister::PC, PC_RESET_VALUE),
        ]);
    }

    fn decode(opcode: Opcode) -> decoder::Result<TapeInstruction> {
        let byte = opcode.try_get_byte(0)?;
        TapeInstruction::from_opcode(byte).ok_or(DecodeError::IllegalOpcode(u32::from(byte)))
    }
}
