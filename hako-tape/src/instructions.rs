use std::fmt;
use std::io::Write;

use hako_core::{Core, CpuResult, Instruction, MemoryDevice, StepStatus, Width};

use crate::cpu::{TapeCore, TapeRegister};

/// The eight tape machine commands, one opcode byte each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TapeInstruction {
    IncrementPointer, // >
    DecrementPointer, // <
    Increment,        // +
    Decrement,        // -
    JumpForward,      // [
    JumpBackward,     // ]
    Output,           // .
    Halt,             // $
}

impl TapeInstruction {
    pub const ALL: [TapeInstruction; 8] = [
        TapeInstruction::IncrementPointer,
        TapeInstruction::DecrementPointer,
        TapeInstruction::Increment,
        TapeInstruction::Decrement,
        TapeInstruction::JumpForward,
        TapeInstruction::JumpBackward,
        TapeInstruction::Output,
        TapeInstruction::Halt,
    ];

    pub const fn opcode(self) -> u8 {
        match self {
            TapeInstruction::IncrementPointer => b'>',
            TapeInstruction::DecrementPointer => b'<',
            TapeInstruction::Increment => b'+',
            TapeInstruction::Decrement => b'-',
            TapeInstruction::JumpForward => b'[',
            TapeInstruction::JumpBackward => b']',
            TapeInstruction::Output => b'.',
            TapeInstruction::Halt => b'$',
        }
    }

    pub fn from_opcode(opcode: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|ins| ins.opcode() == opcode)
    }
}

impl fmt::Display for TapeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.opcode()))
    }
}

impl<W: Write> Instruction<TapeCore<W>> for TapeInstruction {
    fn execute(&self, core: &mut TapeCore<W>) -> CpuResult<StepStatus> {
        let dp = core.data_pointer();
        match self {
            TapeInstruction::IncrementPointer => core.state_mut()[TapeRegister::DP] += 1,
            TapeInstruction::DecrementPointer => core.state_mut()[TapeRegister::DP] -= 1,
            TapeInstruction::Increment => {
                let data = core.mmu_mut().load8(dp)?;
                core.mmu_mut()
                    .store8(dp, (data + 1) & Width::Byte.mask())?;
            }
            TapeInstruction::Decrement => {
                let data = core.mmu_mut().load8(dp)?;
                core.mmu_mut()
                    .store8(dp, data.wrapping_sub(1) & Width::Byte.mask())?;
            }
            TapeInstruction::JumpForward => {
                if core.mmu_mut().load8(dp)? == 0 {
                    let offset = core.find_matched_close_bracket()?;
                    core.state_mut()[TapeRegister::PC] += offset + 1;
                    return Ok(StepStatus::Running);
                }
            }
            TapeInstruction::JumpBackward => {
                if core.mmu_mut().load8(dp)? != 0 {
                    let offset = core.find_matched_open_bracket()?;
                    core.state_mut()[TapeRegister::PC] -= offset - 1;
                    return Ok(StepStatus::Running);
                }
            }
            TapeInstruction::Output => {
                let data = core.mmu_mut().load8(dp)?;
                core.emit(data as u8)?;
            }
            TapeInstruction::Halt => return Ok(StepStatus::Halted),
        }
        core.state_mut()[TapeRegister::PC] += 1;
        Ok(StepStatus::Running)
    }
}
