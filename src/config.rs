//! Host-level configuration: the knobs a CLI or frontend needs to drive
//! [`crate::motherboard::Motherboard`] that aren't guest-visible state.

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rom_path: Option<PathBuf>,
    pub ram_path: Option<PathBuf>,
    /// Periodic RAM snapshot interval, in seconds.
    pub snapshot_interval_secs: u64,
    /// CPU steps executed per host clock tick.
    pub burst_size: u32,
    /// Host clock tick rate driving `run_burst`, in Hz.
    pub tick_hz: u32,
    /// Minimum cycles between host-input bytes fed into ASCI0 RX.
    pub input_interval_cycles: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom_path: None,
            ram_path: None,
            snapshot_interval_secs: 30,
            burst_size: 5000,
            tick_hz: 100,
            input_interval_cycles: 10_000,
        }
    }
}

impl Config {
    /// Load JSON configuration from `path`, falling back to defaults on a
    /// missing file or a parse error. Never fails the caller; any problem
    /// is logged, matching the core's "no error aborts" philosophy at the
    /// host boundary.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("no config at {}: {e}; using defaults", path.display());
                return Config::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("failed to parse config at {}: {e}; using defaults", path.display());
                Config::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/path/config.json"));
        assert_eq!(cfg.burst_size, 5000);
        assert_eq!(cfg.tick_hz, 100);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut cfg = Config::default();
        cfg.burst_size = 1234;
        cfg.save(&path).unwrap();
        let loaded = Config::load_or_default(&path);
        assert_eq!(loaded.burst_size, 1234);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"not json").unwrap();
        let cfg = Config::load_or_default(&path);
        assert_eq!(cfg.burst_size, 5000);
    }
}
