pub mod cpu;
pub mod instructions;
pub mod machine;

pub use crate::cpu::{LoadStoreCore, LoadStoreRegister};
pub use crate::instructions::LoadStoreInstruction;
pub use crate::machine::{LoadStoreLayout, LoadStoreMachine};
