use std::io::Write;

use hako_core::{DataMemory, Machine, MemoryResult, Mmu, ROM};

use crate::cpu::TapeCore;

/// Prints the Fibonacci numbers up to 89, separated by `, `, then halts.
pub const FIBONACCI: &[u8] = b"\
    +++++++++++>+>>>>++++++++++++++++++++++++++++++++++++++++++++>++++++++++++++++++++++++++\
    ++++++<<<<<<[>[>>>>>>+>+<<<<<<<-]>>>>>>>[<<<<<<<+>>>>>>>-]<[>++++++++++[-<-[>>+>+<<<-]>>\
    >[<<<+>>>-]+<[>[-]<[-]]>[<<[>>>+<<<-]>>[-]]<<]>>>[>>+>+<<<-]>>>[<<<+>>>-]+<[>[-]<[-]]>[<\
    <+>>[-]]<<<<<<<]>>>>>[++++++++++++++++++++++++++++++++++++++++++++++++.[-]]++++++++++<[-\
    >-<]>++++++++++++++++++++++++++++++++++++++++++++++++.[-]<<<<<<<<<<<<[>>>+>+<<<<-]>>>>[<\
    <<<+>>>>-]<-[>>.>.<<<[-]]<<[>>+>+<<<-]>>>[<<<+>>>-]<<[<+>-]>[<+>-]<<<-]$";

/// Harvard split: a read-only code store followed by a zeroed data store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapeLayout {
    pub code_base: u64,
    pub code_size: usize,
    pub data_base: u64,
    pub data_size: usize,
}

impl Default for TapeLayout {
    fn default() -> Self {
        Self {
            code_base: 0,
            code_size: 0x800,
            data_base: 0x800,
            data_size: 0x1000,
        }
    }
}

impl TapeLayout {
    pub fn build_mmu(&self, program: &[u8]) -> MemoryResult<Mmu> {
        let mut mmu = Mmu::new();
        mmu.add_device(ROM::new("code", self.code_base, self.code_size, program)?)?;
        mmu.add_device(DataMemory::zeroed(
            "data",
            self.data_base,
            self.data_size,
        ))?;
        Ok(mmu)
    }
}

/// Builds tape machines wired the standard way.
pub struct TapeMachine;

impl TapeMachine {
    pub fn new<W: Write>(program: &[u8], output: W) -> MemoryResult<Machine<TapeCore<W>>> {
        Self::with_layout(TapeLayout::default(), program, output)
    }

    pub fn with_layout<W: Write>(
        layout: TapeLayout,
        program: &[u8],
        output: W,
    ) -> MemoryResult<Machine<TapeCore<W>>> {
        tracing::info!("building tape machine with a {} byte program", program.len());
        let mmu = layout.build_mmu(program)?;
        Ok(Machine::new("tape machine", TapeCore::with_output(mmu, output)))
    }
}
