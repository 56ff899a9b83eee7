pub mod alu;
mod cb;
mod exec;
mod helpers;
mod interrupts;
mod regs;
mod snapshot;
mod trace;


pub use regs::{flags, Registers};
pub use snapshot::RegisterSnapshot;
pub use trace::doctor_line;

/// Abstraction over the memory bus the CPU fetches and stores through.
///
/// The core only needs single-byte access; multi-byte operands are
/// assembled little-endian from consecutive reads. System buses layer
/// device dispatch and IO-register side effects behind this seam.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
}

/// Outcome of a single machine-cycle step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepEvent {
    /// A middle cycle of a multi-cycle instruction; nothing was fetched.
    Idle,
    /// The CPU is halted and consumed the cycle without fetching.
    Halted,
    /// An interrupt was accepted and the service sequence began.
    Service,
    /// An opcode was fetched and fully executed in this cycle.
    Fetched,
}

/// SM83 (LR35902) CPU core.
///
/// The core owns its register file and the interrupt/halt latches; memory
/// is reached exclusively through a borrowed [`Bus`]. One call to
/// [`Cpu::step`] corresponds to exactly one machine cycle (M-cycle) of
/// elapsed time, with multi-cycle instructions padded out by the wait
/// counter.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    /// Set by EI; drained into `ime` only after the following instruction
    /// has completed.
    ei_pending: bool,
    /// CPU is suspended awaiting an interrupt.
    pub halted: bool,
    /// One-shot: the next opcode fetch must not advance PC.
    halt_bug: bool,
    /// Remaining machine cycles before the next fetch boundary.
    wait: u32,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Create a CPU with a zeroed register file.
    ///
    /// Callers force the initial state through a [`RegisterSnapshot`]; the
    /// machine harness installs the post-boot defaults that way.
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            ei_pending: false,
            halted: false,
            halt_bug: false,
            wait: 0,
        }
    }

    /// Reset all registers and latches to the power-on (pre-boot) state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the CPU by one machine cycle.
    ///
    /// The sequence per cycle:
    /// 1. Pay down the wait counter; middle cycles of an instruction
    ///    return [`StepEvent::Idle`] without touching the bus.
    /// 2. Sample IF/IE. With IME set and a request pending, run the
    ///    interrupt service sequence (5 M-cycles).
    /// 3. A halted CPU consumes the cycle; a request in `IF & IE` wakes
    ///    it even with IME clear.
    /// 4. Fetch, dispatch, and execute one opcode; the handler's M-cycle
    ///    cost becomes the new wait counter.
    /// 5. Drain a pending EI into IME once the instruction after the EI
    ///    has fully completed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> StepEvent {
        if self.wait > 0 {
            self.wait -= 1;
            if self.wait > 0 {
                return StepEvent::Idle;
            }
        }

        let pending = self.pending_interrupts(bus);

        if self.ime && pending != 0 {
            self.service_interrupt(bus, pending);
            return StepEvent::Service;
        }

        if self.halted {
            if pending == 0 {
                return StepEvent::Halted;
            }
            // A request in IF & IE wakes the CPU even with IME clear; it
            // resumes at the next instruction without vectoring.
            self.halted = false;
        }

        let opcode = if self.halt_bug {
            // The byte at PC is processed twice: this fetch does not
            // advance PC, so the next fetch re-reads it.
            self.halt_bug = false;
            bus.read8(self.regs.pc)
        } else {
            let opcode = bus.read8(self.regs.pc);
            self.regs.pc = self.regs.pc.wrapping_add(1);
            opcode
        };

        let was_ei_pending = self.ei_pending;
        self.wait = self.exec_opcode(bus, opcode);

        // EI takes effect only after the *next* instruction completes, so
        // an EI immediately followed by DI never enables interrupts.
        if was_ei_pending && self.ei_pending {
            self.ei_pending = false;
            self.ime = true;
        }

        StepEvent::Fetched
    }
}
