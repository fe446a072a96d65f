//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep a PID from being mixed up with a byte count and
//! a split threshold from being built without validation.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::ConfigError;

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// The process being swapped in, plus the two procfs paths derived from it
///
/// The paths are fixed for the duration of a run.
#[derive(Debug, Clone)]
pub struct TargetProcess {
    pid: Pid,
    smaps: PathBuf,
    mem: PathBuf,
}

impl TargetProcess {
    /// Target a live process through `/proc/<pid>/smaps` and `/proc/<pid>/mem`
    #[must_use]
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            smaps: PathBuf::from(format!("/proc/{}/smaps", pid.0)),
            mem: PathBuf::from(format!("/proc/{}/mem", pid.0)),
        }
    }

    /// Target explicit descriptor and memory files (replayed captures, tests)
    #[must_use]
    pub fn from_paths(pid: Pid, smaps: impl Into<PathBuf>, mem: impl Into<PathBuf>) -> Self {
        Self { pid, smaps: smaps.into(), mem: mem.into() }
    }

    #[must_use]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Path of the memory-mapping descriptor
    #[must_use]
    pub fn smaps_path(&self) -> &Path {
        &self.smaps
    }

    /// Path of the raw memory interface
    #[must_use]
    pub fn mem_path(&self) -> &Path {
        &self.mem
    }
}

/// A swapped address range `[offset, end)`
///
/// `swapped_bytes` is what the kernel reported for the whole mapping, which is
/// usually less than `end - offset`. Split children carry their own span instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub offset: u64,
    pub end: u64,
    pub swapped_bytes: u64,
    pub split: bool,
}

impl Region {
    #[must_use]
    pub fn new(offset: u64, end: u64, swapped_bytes: u64) -> Self {
        debug_assert!(offset < end, "region must not be empty");
        Self { offset, end, swapped_bytes, split: false }
    }

    /// Distance covered by this region in the address space
    #[must_use]
    pub fn span(&self) -> u64 {
        self.end - self.offset
    }

    /// Split parents only record provenance and are never dispatched
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        !self.split
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region[0x{:012x}-0x{:012x}]", self.offset, self.end)
    }
}

/// Default split threshold: 64 KiB
pub const DEFAULT_SPLIT_SIZE: u64 = 64 * 1024;

/// Size above which a region is broken into bounded children
///
/// Zero disables splitting; any other value is a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SplitThreshold(u64);

impl SplitThreshold {
    pub const DISABLED: Self = Self(0);

    /// # Errors
    /// Returns [`ConfigError::InvalidSplitSize`] for a non-zero value that is not a power of two
    pub fn new(bytes: u64) -> Result<Self, ConfigError> {
        if bytes == 0 || bytes.is_power_of_two() {
            Ok(Self(bytes))
        } else {
            Err(ConfigError::InvalidSplitSize(bytes))
        }
    }

    #[must_use]
    pub fn bytes(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn is_disabled(self) -> bool {
        self.0 == 0
    }
}

impl Default for SplitThreshold {
    fn default() -> Self {
        Self(DEFAULT_SPLIT_SIZE)
    }
}
