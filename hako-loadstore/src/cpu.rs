use hako_core::cpu::decoder::{self, DecodeError};
use hako_core::cpu::opcode::Opcode;
use hako_core::{Core, Mmu, RegisterFile, RegisterName, Width};

use crate::instructions::LoadStoreInstruction;

hako_core::register_set! {
    /// Sixteen general registers; the last three double as stack pointer, link register and
    /// program counter.
    pub enum LoadStoreRegister {
        R0, R1, R2, R3, R4, R5, R6, R7, R8, R9, R10, R11, R12, SP, LR, PC,
    }
}

pub const OPCODE_INC: u8 = 0x01;

#[derive(Debug)]
pub struct LoadStoreCore {
    mmu: Mmu,
    state: RegisterFile<LoadStoreRegister>,
}

impl LoadStoreCore {
    pub fn new(mmu: Mmu) -> Self {
        Self {
            mmu,
            state: RegisterFile::new(),
        }
    }
}

impl Core for LoadStoreCore {
    type Register = LoadStoreRegister;
    type Instruction = LoadStoreInstruction;

    const INSTRUCTION_WIDTH: Width = Width::Word;
    const PROGRAM_COUNTER: LoadStoreRegister = LoadStoreRegister::PC;

    fn state(&self) -> &RegisterFile<LoadStoreRegister> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RegisterFile<LoadStoreRegister> {
        &mut self.state
    }

    fn mmu(&self) -> &Mmu {
        &self.mmu
    }

    fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.mmu
    }

    fn reset(&mut self) {
        self.state.reset(std::iter::empty());
    }

    fn decode(opcode: Opcode) -> decoder::Result<LoadStoreInstruction> {
        let op = opcode.try_get_byte(0)?;
        match op {
            OPCODE_INC => {
                let index = opcode.try_get_nybble(2)?;
                LoadStoreRegister::from_index(usize::from(index))
                    .map(|register| LoadStoreInstruction::Increment { register })
                    .ok_or(DecodeError::IllegalOpcode(opcode.value()))
            }
            _ => Err(DecodeError::IllegalOpcode(u32::from(op))),
        }
    }
}
