//! Host/IO-boundary error type.
//!
//! Emulation itself never fails: every guest-visible operation in `mmu`,
//! `asci`, `prt`, `io`, and `cpu` is total and has a defined result for
//! every input (unmapped reads return 0xFF, a bad opcode logs and falls
//! through as a no-op, a short ROM is zero-padded, ...). This enum only
//! covers failures that happen before the guest ever sees them: reading a
//! ROM/snapshot file from disk, parsing a configuration file.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ROM image is {len} bytes, which does not fit the 0x80000-byte ROM region")]
    RomTooLarge { len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
