use crate::cpu::{alu, flags, Bus, Cpu};

impl Cpu {
    /// The 0x80..0xBF block: {ADD,ADC,SUB,SBC,AND,XOR,OR,CP} against
    /// {B,C,D,E,H,L,(HL),A}.
    pub(super) fn exec_alu_reg<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let operand = self.read_reg8(bus, opcode & 0x07);
        self.alu_dispatch((opcode >> 3) & 0x07, operand);
        if opcode & 0x07 == 6 {
            2
        } else {
            1
        }
    }

    /// Immediate-operand variants of the eight ALU operations.
    pub(super) fn exec_alu_imm<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        let operand = self.fetch8(bus);
        self.alu_dispatch((opcode >> 3) & 0x07, operand);
        2
    }

    /// Shared 8-way ALU selector. CP behaves as SUB with the result
    /// discarded.
    fn alu_dispatch(&mut self, op: u8, operand: u8) {
        let a = self.regs.a;
        let (value, fl) = match op {
            0 => alu::add(a, operand),
            1 => alu::adc(a, operand, self.regs.carry_in()),
            2 => alu::sub(a, operand),
            3 => alu::sbc(a, operand, self.regs.carry_in()),
            4 => alu::and(a, operand),
            5 => alu::xor(a, operand),
            6 => alu::or(a, operand),
            _ => {
                let (_, fl) = alu::sub(a, operand);
                (a, fl)
            }
        };
        self.regs.a = value;
        self.regs.apply_flags(fl, flags::ALL, 0, 0);
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> u32 {
        let rhs = match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        };
        let (value, fl) = alu::add16(self.regs.hl(), rhs);
        // Z is preserved for the 16-bit add.
        self.regs.apply_flags(fl, flags::H | flags::C, 0, flags::N);
        self.regs.set_hl(value);
        2
    }

    pub(super) fn exec_add_sp_e<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch8(bus);
        let (value, fl) = alu::add16_signed(self.regs.sp, offset);
        self.regs
            .apply_flags(fl, flags::H | flags::C, 0, flags::Z | flags::N);
        self.regs.sp = value;
        4
    }

    pub(super) fn exec_daa(&mut self) -> u32 {
        let (value, fl) = alu::daa(self.regs.a, self.regs.f);
        self.regs.a = value;
        self.regs.apply_flags(fl, flags::ALL, 0, 0);
        1
    }

    /// CPL: A is complemented; N and H are set, Z and C untouched.
    pub(super) fn exec_cpl(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        self.regs.apply_flags(0, 0, flags::N | flags::H, 0);
        1
    }

    pub(super) fn exec_scf(&mut self) -> u32 {
        self.regs.apply_flags(0, 0, flags::C, flags::N | flags::H);
        1
    }

    /// CCF toggles the carry.
    pub(super) fn exec_ccf(&mut self) -> u32 {
        let carry = self.regs.carry_in();
        if carry {
            self.regs.apply_flags(0, 0, 0, flags::N | flags::H | flags::C);
        } else {
            self.regs.apply_flags(0, 0, flags::C, flags::N | flags::H);
        }
        1
    }
}
