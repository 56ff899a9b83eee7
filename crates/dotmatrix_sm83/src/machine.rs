mod timer;


use std::io::{self, Write};

use crate::bus::{BusError, RamBlock, RegBlock, Region, RomBlock, SystemBus};
use crate::cpu::{doctor_line, Cpu, RegisterSnapshot, StepEvent};

use timer::Timer;

/// The CPU core wired to the handheld's memory map, with the timer and
/// divider driven from a monotonic T-cycle counter.
///
/// Layout installed on the bus:
///
/// | Range           | Block |
/// |-----------------|-------|
/// | 0x0000..=0x3FFF | ROM fixed bank |
/// | 0x4000..=0x7FFF | ROM switchable bank (flat view) |
/// | 0x8000..=0x9FFF | VRAM |
/// | 0xA000..=0xBFFF | cartridge RAM |
/// | 0xC000..=0xDFFF | internal RAM |
/// | 0xE000..=0xFDFF | echo of internal RAM (separate block) |
/// | 0xFE00..=0xFFFF | register page |
pub struct Machine {
    pub cpu: Cpu,
    pub bus: SystemBus,
    timer: Timer,
    tcycles: u64,
}

impl Machine {
    pub fn new() -> Result<Self, BusError> {
        let mut bus = SystemBus::new();
        install_map(&mut bus)?;

        let mut cpu = Cpu::new();
        cpu.load_snapshot(&RegisterSnapshot::POST_BOOT);

        Ok(Self {
            cpu,
            bus,
            timer: Timer::new(),
            tcycles: 0,
        })
    }

    /// Install a ROM image: the first bank lands at 0x0000, the second at
    /// 0x4000. Images shorter than two banks leave the remainder zeroed;
    /// longer images are truncated to the flat two-bank view.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), BusError> {
        let mut fixed = RomBlock::new(0x0000, 0x4000)?;
        fixed.load(image);
        self.bus.map_range(0x0000, 0x3FFF, Region::Rom(fixed));

        let mut switchable = RomBlock::new(0x4000, 0x4000)?;
        if image.len() > 0x4000 {
            switchable.load(&image[0x4000..]);
        }
        self.bus.map_range(0x4000, 0x7FFF, Region::Rom(switchable));

        log::info!("loaded {} byte ROM image", image.len());
        Ok(())
    }

    /// Reset the CPU to the post-boot state and restart the clock. The
    /// mapped memory keeps its contents.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.load_snapshot(&RegisterSnapshot::POST_BOOT);
        self.timer = Timer::new();
        self.tcycles = 0;
    }

    /// Advance the machine by one CPU machine cycle (4 T-cycles) and tick
    /// the timer hardware behind it.
    pub fn step(&mut self) -> StepEvent {
        let event = self.cpu.step(&mut self.bus);
        self.tcycles += 4;
        self.timer.advance(&mut self.bus, 4);
        event
    }

    /// Total elapsed T-cycles since power-on or reset.
    pub fn tcycles(&self) -> u64 {
        self.tcycles
    }

    /// Drain any serial bytes the running program has emitted.
    pub fn take_serial(&mut self) -> Vec<u8> {
        self.bus.take_serial()
    }

    /// Run until `max_instructions` opcodes have committed, writing one
    /// doctor-format line per instruction. Returns the number of
    /// instructions traced.
    ///
    /// Each line reflects the state at the fetch boundary, i.e. after the
    /// previous instruction or interrupt entry fully completed. A CPU
    /// that stays halted past the stall guard ends the run early.
    pub fn run_doctor<W: Write>(&mut self, out: &mut W, max_instructions: u64) -> io::Result<u64> {
        let mut committed = 0u64;
        let mut halted_streak = 0u64;
        let mut line = doctor_line(&self.cpu, &mut self.bus);

        while committed < max_instructions {
            match self.step() {
                StepEvent::Fetched => {
                    writeln!(out, "{line}")?;
                    committed += 1;
                    halted_streak = 0;
                    line = doctor_line(&self.cpu, &mut self.bus);
                }
                StepEvent::Service => {
                    halted_streak = 0;
                    line = doctor_line(&self.cpu, &mut self.bus);
                }
                StepEvent::Idle => {}
                StepEvent::Halted => {
                    halted_streak += 1;
                    if halted_streak > STALL_GUARD_CYCLES {
                        log::warn!("CPU halted with no wake source; ending trace");
                        break;
                    }
                }
            }
        }

        Ok(committed)
    }

    /// Run until `count` opcodes have committed (interrupt entries and
    /// halted cycles are not counted), or until the CPU stalls in HALT.
    pub fn run_instructions(&mut self, count: u64) {
        let mut committed = 0u64;
        let mut halted_streak = 0u64;
        while committed < count {
            match self.step() {
                StepEvent::Fetched => {
                    committed += 1;
                    halted_streak = 0;
                }
                StepEvent::Halted => {
                    halted_streak += 1;
                    if halted_streak > STALL_GUARD_CYCLES {
                        log::warn!("CPU halted with no wake source; ending run");
                        break;
                    }
                }
                StepEvent::Idle | StepEvent::Service => halted_streak = 0,
            }
        }
    }
}

/// Consecutive halted machine cycles tolerated before a run loop gives
/// up on the CPU ever waking (about four emulated seconds).
const STALL_GUARD_CYCLES: u64 = 1 << 22;

fn install_map(bus: &mut SystemBus) -> Result<(), BusError> {
    bus.map_range(
        0x0000,
        0x3FFF,
        Region::Rom(RomBlock::new(0x0000, 0x4000)?),
    );
    bus.map_range(
        0x4000,
        0x7FFF,
        Region::Rom(RomBlock::new(0x4000, 0x4000)?),
    );
    bus.map_range(
        0x8000,
        0x9FFF,
        Region::Ram(RamBlock::new(0x8000, 0x2000)?),
    );
    bus.map_range(
        0xA000,
        0xBFFF,
        Region::Ram(RamBlock::new(0xA000, 0x2000)?),
    );
    bus.map_range(
        0xC000,
        0xDFFF,
        Region::Ram(RamBlock::new(0xC000, 0x2000)?),
    );
    // Echo RAM gets its own block rather than aliasing internal RAM; the
    // CPU test ROMs never rely on the mirror.
    bus.map_range(
        0xE000,
        0xFDFF,
        Region::Ram(RamBlock::new(0xE000, 0x1E00)?),
    );
    bus.map_range(
        0xFE00,
        0xFFFF,
        Region::Reg(RegBlock::new(0xFE00, 0x0200)?),
    );
    Ok(())
}
