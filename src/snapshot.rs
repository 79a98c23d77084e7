//! RAM snapshot persistence: a raw, headerless 0x80000-byte blob.
//!
//! Loading silently ignores a missing file or one of the wrong size — an
//! emulator with no prior snapshot simply starts with zeroed RAM (§7).
//! Saving copies the RAM buffer before writing so a write that races a
//! background task always observes a consistent image rather than one
//! torn mid-burst.

use std::path::Path;

use log::{error, info, warn};

use crate::mmu::{Mmu, RAM_SIZE};

pub fn load(path: &Path, mmu: &mut Mmu) {
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            info!("no RAM snapshot at {}: {e}", path.display());
            return;
        }
    };
    if !mmu.load_ram_snapshot(&data) {
        warn!(
            "RAM snapshot at {} is {} bytes, expected {RAM_SIZE}; ignoring",
            path.display(),
            data.len(),
        );
    }
}

pub fn save(path: &Path, mmu: &Mmu) {
    let snapshot = mmu.ram().to_vec();
    if let Err(e) = std::fs::write(path, &snapshot) {
        error!("failed to write RAM snapshot to {}: {e}", path.display());
    }
}
