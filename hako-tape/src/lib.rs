pub mod cpu;
pub mod instructions;
pub mod machine;

pub use crate::cpu::{TapeCore, TapeRegister};
pub use crate::instructions::TapeInstruction;
pub use crate::machine::{TapeLayout, TapeMachine, FIBONACCI};
