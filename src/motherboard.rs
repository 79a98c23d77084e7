//! Motherboard: wires the CPU, MMU/bus, and I/O dispatcher together and
//! drives them through timed execution bursts.
//!
//! The core is single-threaded and cooperative (§5): `Motherboard` owns
//! every emulated component outright and nothing here yields mid-burst.
//! The host driver (a CLI loop, a GUI frame callback, ...) calls
//! [`Motherboard::run_burst`] once per host clock tick.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

use crate::bus::Bus;
use crate::config::Config;
use crate::console::{normalize_paste, Console};
use crate::cpu::Cpu;
use crate::snapshot;

/// Internal I/O base the RomWBW firmware expects after reset/construction.
const FIRMWARE_INTERNAL_BASE: u8 = 0xC0;
/// ICR offset: write sets internal-base = value & 0xC0.
const ICR_PORT: u8 = 0x3F;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Motherboard {
    id: u64,
    cpu: Cpu,
    bus: Bus,

    burst_size: u32,
    input_interval_cycles: u64,
    snapshot_interval_ticks: u64,

    ram_path: Option<PathBuf>,
    pending_input: VecDeque<u8>,
    last_fed_cycle: u64,
    ticks_since_snapshot: u64,
}

impl Motherboard {
    pub fn new(config: &Config) -> Self {
        let mut bus = Bus::new();
        bus.io.write(ICR_PORT, FIRMWARE_INTERNAL_BASE, &mut bus.mmu);

        let snapshot_interval_ticks =
            config.snapshot_interval_secs.saturating_mul(config.tick_hz as u64);

        Motherboard {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            cpu: Cpu::new(),
            bus,
            burst_size: config.burst_size,
            input_interval_cycles: config.input_interval_cycles,
            snapshot_interval_ticks,
            ram_path: config.ram_path.clone(),
            pending_input: VecDeque::new(),
            last_fed_cycle: 0,
            ticks_since_snapshot: 0,
        }
    }

    /// Unique instance identifier, monotonically assigned per process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn load_rom(&mut self, data: &[u8]) {
        self.bus.load_rom(data);
    }

    /// Restore RAM from the configured snapshot path, if any and if it
    /// matches the expected size exactly (§6); otherwise RAM stays zeroed.
    pub fn load_ram_snapshot(&mut self) {
        if let Some(path) = self.ram_path.clone() {
            snapshot::load(&path, &mut self.bus.mmu);
        }
    }

    pub fn queue_input(&mut self, bytes: &[u8]) {
        self.pending_input.extend(bytes.iter().copied());
    }

    /// Normalize pasted text (§6) before enqueuing it for ASCI0 RX.
    pub fn queue_paste(&mut self, text: &str) {
        self.queue_input(&normalize_paste(text));
    }

    /// Run one host-clock tick's worth of work: `burst_size` CPU steps, a
    /// PRT advance by the cycles elapsed, a throttled host-input feed, and
    /// a TX drain to `console`.
    pub fn run_burst(&mut self, console: &mut dyn Console) {
        let cycles_before = self.bus.cycles();

        for _ in 0..self.burst_size {
            self.cpu.step(&mut self.bus);
        }

        let elapsed = self.bus.cycles() - cycles_before;
        self.bus.io.prt.step(elapsed);

        let now = self.bus.cycles();
        if !self.pending_input.is_empty()
            && now.wrapping_sub(self.last_fed_cycle) >= self.input_interval_cycles
        {
            if let Some(byte) = self.pending_input.pop_front() {
                self.bus.io.asci0.receive_from_console(byte);
                self.last_fed_cycle = now;
            }
        }

        let tx = self.bus.io.asci0.drain_tx();
        if !tx.is_empty() {
            console.emit(&tx);
        }

        self.ticks_since_snapshot += 1;
        if self.snapshot_interval_ticks != 0 && self.ticks_since_snapshot >= self.snapshot_interval_ticks {
            self.ticks_since_snapshot = 0;
            self.write_snapshot();
        }
    }

    /// Stop the tick, zero all CPU registers and flags, reset MMU/PRT/ASCI
    /// and the internal-base relocation, and clear the pending-input
    /// queue. RAM and any already-loaded ROM image are untouched.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.pending_input.clear();
        self.last_fed_cycle = 0;
        self.ticks_since_snapshot = 0;
        info!("motherboard {} reset", self.id);
    }

    /// Force a RAM snapshot write, as the core does on shutdown (§4.F).
    pub fn shutdown(&mut self) {
        info!("motherboard {} shutting down", self.id);
        self.write_snapshot();
    }

    fn write_snapshot(&self) {
        if let Some(path) = &self.ram_path {
            snapshot::save(path, &self.bus.mmu);
        }
    }

    pub fn pc(&self) -> u16 {
        self.cpu.pc
    }

    /// Read a byte without accruing bus cycles, for diagnostics.
    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.peek_byte(addr)
    }

    /// Register dump in the teacher's `dump_registers` style, useful for
    /// diagnosing a guest that never progresses past a boot trace.
    pub fn dump_registers(&self) -> String {
        format!(
            "AF={:02X}{:02X} BC={:04X} DE={:04X} HL={:04X}\n\
             IX={:04X} IY={:04X} SP={:04X} PC={:04X}\n\
             I={:02X} R={:02X} IM={} IFF1={} IFF2={} HALTED={}",
            self.cpu.a,
            self.cpu.f,
            self.cpu.bc,
            self.cpu.de,
            self.cpu.hl,
            self.cpu.ix,
            self.cpu.iy,
            self.cpu.sp,
            self.cpu.pc,
            self.cpu.i,
            self.cpu.r,
            self.cpu.im,
            self.cpu.iff1,
            self.cpu.iff2,
            self.cpu.halted,
        )
    }

    /// Ring buffer of recently fetched (PC, opcode) pairs, oldest first.
    pub fn dump_trace(&self) -> String {
        let mut out = String::new();
        for entry in self.cpu.trace() {
            out.push_str(&format!("PC={:04X} opcode={:02X}\n", entry.pc, entry.opcode));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CollectConsole(Vec<u8>);
    impl Console for CollectConsole {
        fn emit(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes);
        }
    }

    #[test]
    fn boot_trace_follows_an_initial_jump() {
        let mut mb = Motherboard::new(&Config { burst_size: 1, ..Config::default() });
        mb.load_rom(&[0xC3, 0x00, 0x01]); // JP 0x0100
        let mut console = CollectConsole(Vec::new());
        mb.run_burst(&mut console);
        assert_eq!(mb.pc(), 0x0100);
    }

    #[test]
    fn asci_tx_drains_to_the_console_collaborator() {
        // LD A,0x41 ; OUT0 (0xC6),A -- port 0xC6 is internal offset 0x06
        // (ASCI0 TDR) once the internal base is relocated to 0xC0.
        let mut mb = Motherboard::new(&Config { burst_size: 2, ..Config::default() });
        mb.load_rom(&[0x3E, 0x41, 0xED, 0x39, 0xC6]);
        let mut console = CollectConsole(Vec::new());
        mb.run_burst(&mut console);
        assert_eq!(console.0, vec![0x41]);
    }

    #[test]
    fn host_input_is_fed_into_asci0_rx_after_the_interval() {
        let mut mb = Motherboard::new(&Config {
            burst_size: 3,
            input_interval_cycles: 0,
            ..Config::default()
        });
        mb.load_rom(&[0x00, 0x00, 0x00]);
        mb.bus.io.asci0.write_cntla(0x08); // enable RIE so pending data is observable
        mb.queue_input(&[0x5A]);
        let mut console = CollectConsole(Vec::new());
        mb.run_burst(&mut console);
        assert!(mb.bus.io.asci0.interrupt_pending());
        assert!(mb.pending_input.is_empty());
    }

    #[test]
    fn reset_reestablishes_the_firmware_internal_base_and_clears_input() {
        let mut mb = Motherboard::new(&Config::default());
        mb.bus.io.write(ICR_PORT, 0x00, &mut mb.bus.mmu);
        mb.queue_input(&[1, 2, 3]);
        mb.cpu.a = 0x5A;
        mb.cpu.bc = 0x1234;
        mb.cpu.sp = 0x8000;
        mb.cpu.iff1 = true;
        mb.reset();
        assert_eq!(mb.bus.io.read(ICR_PORT, &mut mb.bus.mmu), FIRMWARE_INTERNAL_BASE);
        assert!(mb.pending_input.is_empty());
        assert_eq!(mb.pc(), 0);
        assert_eq!(mb.cpu.a, 0);
        assert_eq!(mb.cpu.bc, 0);
        assert_eq!(mb.cpu.sp, 0);
        assert!(!mb.cpu.iff1);
    }

    #[test]
    fn shutdown_writes_a_ram_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let ram_path = dir.path().join("ram.bin");
        let mut mb = Motherboard::new(&Config {
            ram_path: Some(ram_path.clone()),
            ..Config::default()
        });
        mb.shutdown();
        assert_eq!(std::fs::metadata(&ram_path).unwrap().len(), crate::mmu::RAM_SIZE as u64);
    }

    #[test]
    fn each_instance_gets_a_distinct_id() {
        let a = Motherboard::new(&Config::default());
        let b = Motherboard::new(&Config::default());
        assert_ne!(a.id(), b.id());
    }
}
