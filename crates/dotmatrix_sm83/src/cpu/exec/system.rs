use crate::cpu::{alu, flags, Bus, Cpu};

impl Cpu {
    /// RLCA/RRCA/RLA/RRA. Unlike the CB-prefixed rotates, Z is forced
    /// clear regardless of the result.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> u32 {
        let a = self.regs.a;
        let (value, fl) = match opcode {
            0x07 => alu::rlc(a),
            0x0F => alu::rrc(a),
            0x17 => alu::rl(a, self.regs.carry_in()),
            _ => alu::rr(a, self.regs.carry_in()),
        };
        self.regs.a = value;
        self.regs
            .apply_flags(fl, flags::C, 0, flags::Z | flags::N | flags::H);
        1
    }

    /// HALT suspends the CPU until an interrupt request appears in
    /// IF & IE. Executed with IME clear while a request is already
    /// pending, the CPU does not halt; instead the next opcode byte is
    /// fetched twice (the halt bug).
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if !self.ime && self.pending_interrupts(bus) != 0 {
            self.halt_bug = true;
        } else {
            self.halted = true;
        }
        1
    }

    /// STOP is a no-op at the core level; the outer harness may layer
    /// low-power semantics on top.
    pub(super) fn exec_stop(&mut self) -> u32 {
        1
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ei_pending = false;
        1
    }

    /// EI arms the delayed enable; IME turns on only after the next
    /// instruction completes.
    pub(super) fn exec_ei(&mut self) -> u32 {
        self.ei_pending = true;
        1
    }

    /// Unusable opcode slots (0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC,
    /// 0xED, 0xF4, 0xFC, 0xFD) execute as one-cycle no-ops with a
    /// diagnostic; PC has already moved past the offending byte.
    pub(super) fn exec_unknown(&mut self, opcode: u8) -> u32 {
        log::warn!(
            "unknown opcode 0x{:02X} at PC=0x{:04X}, treating as NOP",
            opcode,
            self.regs.pc.wrapping_sub(1)
        );
        1
    }
}
