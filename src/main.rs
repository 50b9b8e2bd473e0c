use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use hako_core::{Core, Machine, MemoryDevice, RunOutcome};
use hako_loadstore::LoadStoreMachine;
use hako_tape::{TapeMachine, FIBONACCI};
use tracing_flame::FlameLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Arch {
    /// Eight-command tape machine
    Tape,
    /// Sixteen-register load/store machine
    LoadStore,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Architecture to emulate
    #[arg(short, long, value_enum, default_value_t = Arch::Tape)]
    arch: Arch,

    /// Program image; the tape machine runs its built-in Fibonacci program without one
    program: Option<PathBuf>,

    /// Stop after this many steps even if the machine has not halted
    #[arg(long)]
    max_steps: Option<u64>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Record a folded-stack flame graph trace to this file
    #[arg(long)]
    flame: Option<PathBuf>,
}

fn level_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn run<C: Core>(mut machine: Machine<C>, max_steps: Option<u64>) -> Result<()> {
    let outcome = machine.run(max_steps);

    let core = machine.core();
    tracing::info!("registers: {}", core.state());
    let stats = core.mmu().stats();
    tracing::info!(
        "memory: {} reads ({} bytes), {} writes ({} bytes)",
        stats.num_reads,
        stats.bytes_read,
        stats.num_writes,
        stats.bytes_written
    );

    match outcome.with_context(|| format!("core faulted after {} steps", machine.steps()))? {
        RunOutcome::Halted { steps } => {
            println!("\nBye-bye :-)\n");
            tracing::info!("halted after {} steps", steps);
        }
        RunOutcome::StepLimitReached { steps } => {
            tracing::warn!("stopped after {} steps without halting", steps);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (flame_layer, _flame_guard) = match &args.flame {
        Some(path) => {
            let (layer, guard) = FlameLayer::with_file(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    let stderr_format = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(level_filter(args.verbose))
        .with(stderr_format)
        .with(flame_layer)
        .init();

    let program = match &args.program {
        Some(path) => {
            tracing::info!("loading program {}", path.display());
            let bytes = fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(bytes)
        }
        None => None,
    };

    match args.arch {
        Arch::Tape => {
            let program = program.as_deref().unwrap_or(FIBONACCI);
            run(TapeMachine::new(program, io::stdout())?, args.max_steps)
        }
        Arch::LoadStore => {
            let Some(program) = program else {
                bail!("the load/store machine has no built-in program; pass a program file");
            };
            run(LoadStoreMachine::new(&program)?, args.max_steps)
        }
    }
}
