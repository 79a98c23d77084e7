mod instructions;
mod parity;

use super::Cpu;
use crate::bus::Bus;

/// Load a short instruction stream at logical address 0 and return a CPU
/// ready to step through it. The MMU's BBR is pointed at the RAM-backed
/// region so the loaded bytes (and any scratch writes below 0xF000) land in
/// writable memory instead of the default ROM mapping.
pub(super) fn run(program: &[u8]) -> (Cpu, Bus) {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    bus.mmu.set_bbr(0x80);
    for (i, &b) in program.iter().enumerate() {
        bus.mmu.write(i as u16, b);
    }
    cpu.pc = 0;
    cpu.sp = 0xE000;
    (cpu, bus)
}

#[test]
fn step_advances_pc_past_a_one_byte_nop() {
    let (mut cpu, mut bus) = run(&[0x00, 0x00]);
    cpu.step(&mut bus);
    assert_eq!(cpu.pc, 1);
}

#[test]
fn step_reports_nonzero_cycles() {
    let (mut cpu, mut bus) = run(&[0x00]);
    let cycles = cpu.step(&mut bus);
    assert!(cycles > 0);
}
