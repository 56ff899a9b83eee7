use super::{Bus, Cpu};

/// Format one frame of the "doctor" execution log: the register state
/// plus the four bytes at PC, sampled at a fetch boundary.
///
/// The format is diffable against reference emulator logs, one line per
/// committed instruction:
///
/// ```text
/// A:01 F:B0 B:00 C:13 D:00 E:D8 H:01 L:4D SP:FFFE PC:0100 PCMEM:00,C3,13,02
/// ```
pub fn doctor_line<B: Bus>(cpu: &Cpu, bus: &mut B) -> String {
    let regs = &cpu.regs;
    let pc = regs.pc;
    format!(
        "A:{:02X} F:{:02X} B:{:02X} C:{:02X} D:{:02X} E:{:02X} H:{:02X} L:{:02X} \
         SP:{:04X} PC:{:04X} PCMEM:{:02X},{:02X},{:02X},{:02X}",
        regs.a,
        regs.f,
        regs.b,
        regs.c,
        regs.d,
        regs.e,
        regs.h,
        regs.l,
        regs.sp,
        pc,
        bus.read8(pc),
        bus.read8(pc.wrapping_add(1)),
        bus.read8(pc.wrapping_add(2)),
        bus.read8(pc.wrapping_add(3)),
    )
}
