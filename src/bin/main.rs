//! Headless CLI driver: loads a ROM (and optionally a RAM snapshot), then
//! pumps the guest at the configured tick rate over stdin/stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use z180_core::config::Config;
use z180_core::console::Console;
use z180_core::mmu::ROM_SIZE;
use z180_core::{Error, Motherboard};

#[derive(Parser, Debug)]
#[command(name = "z180emu", about = "Z180 single-board computer emulator (SC126/SC131 family)")]
struct Args {
    /// RomWBW firmware ROM image.
    #[arg(long)]
    rom: PathBuf,

    /// RAM snapshot to restore on boot and persist to periodically.
    #[arg(long)]
    ram: Option<PathBuf>,

    /// JSON configuration file; missing or malformed falls back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

struct StdioConsole;

impl Console for StdioConsole {
    fn emit(&mut self, bytes: &[u8]) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let _ = lock.write_all(bytes);
        let _ = lock.flush();
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    config.rom_path = Some(args.rom.clone());
    if args.ram.is_some() {
        config.ram_path = args.ram.clone();
    }

    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("reading ROM image at {}", args.rom.display()))?;
    if rom.len() > ROM_SIZE {
        return Err(Error::RomTooLarge { len: rom.len() }.into());
    }

    let mut motherboard = Motherboard::new(&config);
    motherboard.load_rom(&rom);
    motherboard.load_ram_snapshot();
    info!("motherboard {} booting {}", motherboard.id(), args.rom.display());

    let mut console = StdioConsole;
    let tick_period = Duration::from_secs_f64(1.0 / config.tick_hz.max(1) as f64);

    loop {
        let tick_start = Instant::now();

        let mut input = [0u8; 256];
        if let Ok(n) = try_read_stdin(&mut input) {
            if n > 0 {
                motherboard.queue_input(&input[..n]);
            }
        }

        motherboard.run_burst(&mut console);

        if let Some(remaining) = tick_period.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}

/// Reads whatever is currently buffered on stdin. A blocking read here
/// would stall the tick loop while waiting on an interactive terminal;
/// this crate doesn't attempt raw-mode/non-blocking terminal handling,
/// so a frontend piping input (rather than a live keyboard) is assumed.
fn try_read_stdin(buf: &mut [u8]) -> io::Result<usize> {
    io::stdin().read(buf)
}
