use super::{Bus, Cpu};

/// Interrupt flag register.
pub(super) const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register.
pub(super) const IE_ADDR: u16 = 0xFFFF;

impl Cpu {
    /// The set of requested-and-enabled interrupt lines, lowest bit
    /// highest priority: 0=VBlank, 1=LCD STAT, 2=Timer, 3=Serial,
    /// 4=Joypad.
    #[inline]
    pub(super) fn pending_interrupts<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let iflags = bus.read8(IF_ADDR);
        let enable = bus.read8(IE_ADDR);
        iflags & enable & 0x1F
    }

    /// Run the interrupt service sequence for the highest-priority line
    /// in `pending` (which must be non-zero).
    ///
    /// IME drops, the line's IF bit is acknowledged, PC is pushed high
    /// byte then low byte, and execution vectors to 0x40 + 8 * line. The
    /// whole entry costs 5 machine cycles.
    pub(super) fn service_interrupt<B: Bus>(&mut self, bus: &mut B, pending: u8) {
        debug_assert!(pending & 0x1F != 0);

        self.ime = false;
        self.halted = false;

        let line = pending.trailing_zeros() as u16;
        let iflags = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflags & !(1 << line));

        let pc = self.regs.pc;
        self.push16(bus, pc);
        self.regs.pc = 0x0040 + 8 * line;

        log::debug!(
            "interrupt line {} accepted, pc=0x{:04X} -> 0x{:04X}",
            line,
            pc,
            self.regs.pc
        );

        self.wait = 5;
    }
}
