//! Structured error types for deswap
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The mapping descriptor could not be scanned; fatal before any dispatch
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single region could not be opened or positioned; absorbed as an ERR outcome
#[derive(Error, Debug)]
pub enum RegionError {
    #[error("open: {0}")]
    Open(#[source] io::Error),

    #[error("seek to 0x{offset:x}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

/// Bytes recovered by the workers do not add up to what was eligible
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("failed to swap-in some memory (read-diff: {} kB)", shortfall_kb(.expected, .recovered))]
pub struct ConsistencyError {
    pub expected: u64,
    pub recovered: u64,
}

impl ConsistencyError {
    #[must_use]
    pub fn shortfall(&self) -> u64 {
        self.expected.saturating_sub(self.recovered)
    }
}

fn shortfall_kb(expected: &u64, recovered: &u64) -> u64 {
    expected.saturating_sub(*recovered) / 1024
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bad read split size value: {0} (must be 0 or a power of two)")]
    InvalidSplitSize(u64),

    #[error("invalid thread value: worker count must be at least 1")]
    ZeroWorkers,
}

#[derive(Error, Debug)]
pub enum DeswapError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}
