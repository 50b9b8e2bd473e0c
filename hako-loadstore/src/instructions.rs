use std::fmt;

use hako_core::{Core, CpuResult, Instruction, StepStatus};

use crate::cpu::{LoadStoreCore, LoadStoreRegister};

const INSTRUCTION_SIZE: u32 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadStoreInstruction {
    Increment { register: LoadStoreRegister }, // 0x01, register index in bits 8..11
}

impl fmt::Display for LoadStoreInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStoreInstruction::Increment { register } => write!(f, "INC {}", register),
        }
    }
}

impl Instruction<LoadStoreCore> for LoadStoreInstruction {
    fn execute(&self, core: &mut LoadStoreCore) -> CpuResult<StepStatus> {
        match self {
            LoadStoreInstruction::Increment { register } => {
                core.state_mut()[*register] += 1;
            }
        }
        core.state_mut()[LoadStoreRegister::PC] += INSTRUCTION_SIZE;
        Ok(StepStatus::Running)
    }
}
