//! Pre-flight checks for deswap
//!
//! Validates that the target process is there and that its procfs entries can be
//! opened before any scanning starts, with actionable error messages.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

use crate::domain::{Pid, TargetProcess};

/// Run all pre-flight checks for `target`
///
/// The memory interface is only opened when memory will actually be read.
pub fn run_preflight_checks(target: &TargetProcess, dry_run: bool, quiet: bool) -> Result<()> {
    check_privileges(quiet);
    check_process_exists(target.pid())?;
    check_smaps_access(target)?;
    if !dry_run {
        check_mem_access(target)?;
    }
    Ok(())
}

/// Warn when not running as root
///
/// Reading another user's process memory needs ptrace access, which root has.
/// Same-user targets usually work without it, so this is not fatal.
fn check_privileges(quiet: bool) {
    if quiet || unsafe { libc::geteuid() } == 0 {
        return;
    }
    eprintln!("warning: not running as root; reading the target's memory may be denied");
}

/// Check if the target process exists
pub fn check_process_exists(pid: Pid) -> Result<()> {
    let proc_path = format!("/proc/{}", pid.0);
    if !Path::new(&proc_path).exists() {
        bail!(
            "Process {} not found.\n\n\
             Is the process still running? Check with: ps -p {}",
            pid.0,
            pid.0
        );
    }
    Ok(())
}

/// Check if we can open the process's memory mapping descriptor
pub fn check_smaps_access(target: &TargetProcess) -> Result<()> {
    let smaps = target.smaps_path();
    File::open(smaps).with_context(|| {
        format!(
            "Cannot read {}\n\n\
             This usually means:\n\
             - The process doesn't exist (check: ps -p {})\n\
             - Permission denied (run with sudo)\n\
             - /proc is not mounted",
            smaps.display(),
            target.pid().0
        )
    })?;
    Ok(())
}

/// Check if we can open the process's memory interface
pub fn check_mem_access(target: &TargetProcess) -> Result<()> {
    let mem = target.mem_path();
    File::open(mem).with_context(|| {
        format!(
            "Cannot open {}\n\n\
             Reading process memory requires ptrace access to the target:\n\
             - Run with sudo, or\n\
             - Check /proc/sys/kernel/yama/ptrace_scope",
            mem.display()
        )
    })?;
    Ok(())
}
