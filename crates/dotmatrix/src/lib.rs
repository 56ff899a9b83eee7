use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use typed_builder::TypedBuilder;

use dotmatrix_sm83::{Machine, StepEvent};

/// What a run should execute and where its outputs go.
#[derive(TypedBuilder)]
pub struct RunConfig {
    /// Path of the ROM image to load.
    pub rom_path: PathBuf,
    /// When set, write a doctor-format trace line per committed
    /// instruction to this file instead of streaming serial output.
    #[builder(default)]
    pub doctor_path: Option<PathBuf>,
    /// Instruction budget for the run.
    #[builder(default = 2_000_000)]
    pub max_instructions: u64,
}

/// Load the ROM and drive the machine to its instruction budget.
///
/// In the default mode, serial bytes the program emits are streamed to
/// stdout as they appear (this is how the CPU test ROMs report their
/// results). With a doctor path configured the run produces the trace
/// file instead, for diffing against a known-good log.
pub fn run(config: RunConfig) -> Result<()> {
    let rom = fs::read(&config.rom_path)
        .with_context(|| format!("failed to read ROM {}", config.rom_path.display()))?;

    let mut machine = Machine::new().context("failed to build the machine")?;
    machine
        .load_rom(&rom)
        .context("failed to install the ROM image")?;

    match &config.doctor_path {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create trace file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            let committed = machine.run_doctor(&mut out, config.max_instructions)?;
            out.flush()?;
            log::info!("traced {} instructions to {}", committed, path.display());
        }
        None => {
            run_with_serial(&mut machine, config.max_instructions)?;
        }
    }

    Ok(())
}

fn run_with_serial(machine: &mut Machine, max_instructions: u64) -> Result<()> {
    // Consecutive halted cycles tolerated before giving up on a wake.
    const STALL_GUARD: u64 = 1 << 22;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut committed = 0u64;
    let mut halted_streak = 0u64;

    while committed < max_instructions {
        match machine.step() {
            StepEvent::Fetched => {
                committed += 1;
                halted_streak = 0;
            }
            StepEvent::Halted => {
                halted_streak += 1;
                if halted_streak > STALL_GUARD {
                    log::warn!("CPU halted with no wake source; stopping");
                    break;
                }
            }
            _ => halted_streak = 0,
        }

        let serial = machine.take_serial();
        if !serial.is_empty() {
            out.write_all(&serial)?;
            out.flush()?;
        }
    }

    Ok(())
}
