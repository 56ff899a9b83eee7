use super::{alu, flags, Bus, Cpu};

impl Cpu {
    /// Execute a CB-prefixed instruction and return the total M-cycle
    /// cost including the prefix fetch.
    ///
    /// The table has a four-quadrant structure over {B,C,D,E,H,L,(HL),A}:
    /// rotates/shifts/swap, then BIT, RES, and SET. The (HL)-mediated
    /// forms pay one extra cycle for the read-modify-write; BIT only
    /// reads, so it pays for the read alone.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let opcode = self.fetch8(bus);
        let quadrant = opcode >> 6;
        let n = (opcode >> 3) & 0x07;
        let reg = opcode & 0x07;

        match quadrant {
            0 => {
                let value = self.read_reg8(bus, reg);
                let (value, fl) = match n {
                    0 => alu::rlc(value),
                    1 => alu::rrc(value),
                    2 => alu::rl(value, self.regs.carry_in()),
                    3 => alu::rr(value, self.regs.carry_in()),
                    4 => alu::sla(value),
                    5 => alu::sra(value),
                    6 => alu::swap(value),
                    _ => alu::srl(value),
                };
                self.write_reg8(bus, reg, value);
                self.regs.apply_flags(fl, flags::ALL, 0, 0);
                if reg == 6 {
                    4
                } else {
                    2
                }
            }
            1 => {
                // BIT n: Z from the tested bit, H set, N cleared, C kept.
                let value = self.read_reg8(bus, reg);
                let fl = alu::bit(n, value);
                self.regs.apply_flags(fl, flags::Z, flags::H, flags::N);
                if reg == 6 {
                    3
                } else {
                    2
                }
            }
            2 => {
                // RES n: no flag effect.
                let value = self.read_reg8(bus, reg) & !(1 << n);
                self.write_reg8(bus, reg, value);
                if reg == 6 {
                    4
                } else {
                    2
                }
            }
            _ => {
                // SET n: no flag effect.
                let value = self.read_reg8(bus, reg) | (1 << n);
                self.write_reg8(bus, reg, value);
                if reg == 6 {
                    4
                } else {
                    2
                }
            }
        }
    }
}
