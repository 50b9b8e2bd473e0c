mod component;
mod machine;
mod mmu;
mod storage;

pub mod cpu;
pub mod memory;
pub mod register;

pub use crate::component::{Component, ComponentId};
pub use crate::cpu::{Core, CpuError, CpuResult, Instruction, StepStatus};
pub use crate::machine::{Machine, RunOutcome};
pub use crate::memory::{
    Access, AccessStats, MemoryDevice, MemoryError, MemoryRequest, MemoryResponse, MemoryResult,
    Width,
};
pub use crate::mmu::{Mmu, ADDRESS_SPACE_SIZE};
pub use crate::register::{Register, RegisterFile, RegisterName};
pub use crate::storage::{DataMemory, RAM, ROM};
