//! Terminal rendering of run progress and results
//!
//! Per-region lines go to stderr, the banner and summary to stdout.

use std::path::Path;
use std::time::Duration;

use crate::domain::{Pid, SplitThreshold};
use crate::report::{Outcome, RegionEvent, RunReport};
use crate::units::format_bytes;
use crate::yank::RunPlan;

/// How much per-region detail to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Banner, plan and summary; no per-region lines
    #[default]
    Quiet,
    /// One line per region
    Regions,
    /// Per-region lines plus per-chunk trace logging
    Chunks,
}

impl From<u8> for Verbosity {
    fn from(level: u8) -> Self {
        match level {
            0 => Self::Quiet,
            1 => Self::Regions,
            _ => Self::Chunks,
        }
    }
}

/// Format one region outcome as a log line
#[must_use]
pub fn format_region_event(mem: &Path, event: &RegionEvent) -> String {
    let region = &event.region;
    let prefix = format!(
        "deswap: yank:\t{}: region[0x{:012x}-0x{:012x}]: {:8} kB",
        mem.display(),
        region.offset,
        region.end,
        region.swapped_bytes / 1024
    );

    match &event.outcome {
        Outcome::Ok { .. } => format!("{prefix} OK"),
        Outcome::Warn { failed, attempted } => {
            format!("{prefix} WARN:\tread-fail: {failed:<8}/{attempted:8}")
        }
        Outcome::Err { error, .. } => format!("{prefix} ERR:\t{error}"),
        Outcome::NoOp => format!("{prefix} NO-OP"),
    }
}

/// Print a region outcome if the verbosity asks for it
pub fn display_region_event(mem: &Path, event: &RegionEvent, verbosity: Verbosity) {
    if verbosity >= Verbosity::Regions {
        eprintln!("{}", format_region_event(mem, event));
    }
}

/// Print the start-of-run banner
pub fn display_banner(pid: Pid, workers: usize, threshold: SplitThreshold, dry_run: bool) {
    let split =
        if threshold.is_disabled() { "off".to_string() } else { format_bytes(threshold.bytes()) };
    println!("deswap: main:\tPID {} (threads: {workers}, split: {split}, no-op: {dry_run})", pid.0);
}

/// Format the scan and split totals
#[must_use]
pub fn format_plan(smaps: &Path, plan: &RunPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "deswap: smaps:\t{}: in-swap: {} kB, regions: {}",
        smaps.display(),
        plan.swapped_bytes / 1024,
        plan.scanned_regions
    )];
    if !plan.split_threshold.is_disabled() {
        lines.push(format!(
            "deswap: smaps:\t{}: to-read: {} kB, regions: {} (split {} into {})",
            smaps.display(),
            plan.expected_bytes / 1024,
            plan.eligible_regions,
            plan.split.broken,
            plan.split.children
        ));
    }
    lines
}

/// Print the scan and split totals, before any region is read
pub fn display_plan(smaps: &Path, plan: &RunPlan) {
    for line in format_plan(smaps, plan) {
        println!("{line}");
    }
}

/// Print the end-of-run summary
pub fn display_summary(report: &RunReport) {
    let counts = &report.outcomes;
    println!(
        "deswap: yank:\tregions: {} (ok: {}, warn: {}, err: {}, no-op: {})",
        counts.total(),
        counts.ok,
        counts.warn,
        counts.err,
        counts.noop
    );
    if report.dry_run {
        println!(
            "deswap: main:\tOK; no-op run over {} kB in {}",
            report.expected_bytes / 1024,
            format_elapsed(report.elapsed)
        );
    } else {
        println!(
            "deswap: main:\tOK; swapped-in {} kB in {}",
            report.recovered_bytes / 1024,
            format_elapsed(report.elapsed)
        );
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_secs_f64())
}
