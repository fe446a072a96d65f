//! Access to a process's raw memory interface
//!
//! Workers never share a handle: every region gets its own `open`, so there is
//! no seek position for two threads to fight over.

#![allow(unsafe_code)] // sysconf() requires unsafe

use std::fs::File;
use std::io::{self, Read, Seek};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::domain::TargetProcess;

/// Fallback when the page size cannot be queried
const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(size) => size,
    None => unreachable!(),
};

/// Something that can hand out fresh seekable readers over a process's memory
pub trait MemorySource: Sync {
    type Handle: Read + Seek;

    /// Open a new, independent handle
    ///
    /// # Errors
    /// Returns the I/O error reported by the underlying open
    fn open(&self) -> io::Result<Self::Handle>;

    /// Human-readable location used in log lines
    fn location(&self) -> &Path;
}

/// `/proc/<pid>/mem` (or any file standing in for it)
#[derive(Debug, Clone)]
pub struct ProcMem {
    path: PathBuf,
}

impl ProcMem {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn for_target(target: &TargetProcess) -> Self {
        Self::new(target.mem_path())
    }
}

impl MemorySource for ProcMem {
    type Handle = File;

    fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// The system memory page size, used as the read chunk size
#[must_use]
pub fn page_size() -> NonZeroUsize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size).ok().and_then(NonZeroUsize::new).unwrap_or(DEFAULT_PAGE_SIZE)
}
