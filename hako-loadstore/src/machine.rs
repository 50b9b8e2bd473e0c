use hako_core::{Machine, MemoryResult, Mmu, RAM};

use crate::cpu::LoadStoreCore;

/// A single RAM holding both code and data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadStoreLayout {
    pub ram_base: u64,
    pub ram_size: usize,
}

impl Default for LoadStoreLayout {
    fn default() -> Self {
        Self {
            ram_base: 0,
            ram_size: 0x1_0000,
        }
    }
}

pub struct LoadStoreMachine;

impl LoadStoreMachine {
    pub fn new(program: &[u8]) -> MemoryResult<Machine<LoadStoreCore>> {
        Self::with_layout(LoadStoreLayout::default(), program)
    }

    /// The program is copied to the start of RAM; execution begins at address 0.
    pub fn with_layout(
        layout: LoadStoreLayout,
        program: &[u8],
    ) -> MemoryResult<Machine<LoadStoreCore>> {
        let mut mmu = Mmu::new();
        mmu.add_device(RAM::new("ram", layout.ram_base, layout.ram_size))?;
        mmu.load_data(layout.ram_base, program)?;
        Ok(Machine::new("load/store machine", LoadStoreCore::new(mmu)))
    }
}
