//! Run results handed back to the caller
//!
//! The core never formats output itself; it produces [`RegionEvent`]s while the
//! run is in progress and a [`RunReport`] at the end. Rendering lives in
//! [`crate::display`], persistence in [`crate::export`].

use serde::Serialize;
use std::time::Duration;

use crate::domain::{ConsistencyError, Pid, Region, SplitThreshold};
use crate::split::SplitStats;

/// Stage at which a region was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedStage {
    Open,
    Seek,
}

/// Terminal state of one dispatched region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    /// Every chunk was read; the region's bytes were credited
    Ok { chunks: u64 },
    /// Some chunks failed to read; nothing was credited
    Warn { failed: u64, attempted: u64 },
    /// The memory interface could not be opened or positioned
    Err { stage: FailedStage, error: String },
    /// Dry run: no I/O was performed
    NoOp,
}

impl Outcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "OK",
            Self::Warn { .. } => "WARN",
            Self::Err { .. } => "ERR",
            Self::NoOp => "NO-OP",
        }
    }
}

/// What happened to one eligible region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionEvent {
    /// Index of the worker that handled the region
    pub worker: usize,
    pub region: Region,
    pub outcome: Outcome,
}

impl RegionEvent {
    /// Bytes this region contributed to the recovered total
    #[must_use]
    pub fn credited_bytes(&self) -> u64 {
        match self.outcome {
            Outcome::Ok { .. } => self.region.swapped_bytes,
            _ => 0,
        }
    }

    /// Bytes this region leaves unrecovered; a dry run leaves none
    #[must_use]
    pub fn missed_bytes(&self) -> u64 {
        match self.outcome {
            Outcome::Warn { .. } | Outcome::Err { .. } => self.region.swapped_bytes,
            Outcome::Ok { .. } | Outcome::NoOp => 0,
        }
    }
}

/// Per-outcome region counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub ok: usize,
    pub warn: usize,
    pub err: usize,
    pub noop: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Ok { .. } => self.ok += 1,
            Outcome::Warn { .. } => self.warn += 1,
            Outcome::Err { .. } => self.err += 1,
            Outcome::NoOp => self.noop += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.ok + self.warn + self.err + self.noop
    }
}

/// Result of one swap-in run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pid: Pid,
    pub dry_run: bool,
    pub workers: usize,
    pub split_threshold: SplitThreshold,
    /// Bytes in swap as reported by the kernel, before splitting
    pub swapped_bytes: u64,
    /// Regions found by the scanner
    pub scanned_regions: usize,
    pub split: SplitStats,
    /// Sum of `swapped_bytes` over eligible regions
    pub expected_bytes: u64,
    pub eligible_regions: usize,
    /// Bytes of regions that were read back completely
    pub recovered_bytes: u64,
    /// Bytes of regions that ended WARN or ERR
    pub unrecovered_bytes: u64,
    pub outcomes: OutcomeCounts,
    pub events: Vec<RegionEvent>,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunReport {
    /// Final pass/fail decision for the run
    ///
    /// A dry run always passes. Otherwise every eligible byte must have been recovered.
    ///
    /// # Errors
    /// Returns [`ConsistencyError`] with the shortfall when recovered and expected totals differ
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        if self.dry_run || self.recovered_bytes == self.expected_bytes {
            Ok(())
        } else {
            Err(ConsistencyError { expected: self.expected_bytes, recovered: self.recovered_bytes })
        }
    }
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(expected: u64, recovered: u64, dry_run: bool) -> RunReport {
        RunReport {
            pid: Pid(1),
            dry_run,
            workers: 1,
            split_threshold: SplitThreshold::default(),
            swapped_bytes: expected,
            scanned_regions: 1,
            split: SplitStats::default(),
            expected_bytes: expected,
            eligible_regions: 1,
            recovered_bytes: recovered,
            unrecovered_bytes: expected - recovered,
            outcomes: OutcomeCounts::default(),
            events: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_verify_complete_run() {
        assert!(report(8192, 8192, false).verify().is_ok());
    }

    #[test]
    fn test_verify_shortfall() {
        let err = report(8192, 4096, false).verify().unwrap_err();
        assert_eq!(err.shortfall(), 4096);
    }

    #[test]
    fn test_verify_dry_run_always_passes() {
        assert!(report(8192, 0, true).verify().is_ok());
    }

    #[test]
    fn test_credited_bytes() {
        let region = Region::new(0x1000, 0x3000, 8192);
        let ok = RegionEvent { worker: 0, region, outcome: Outcome::Ok { chunks: 2 } };
        let warn =
            RegionEvent { worker: 0, region, outcome: Outcome::Warn { failed: 1, attempted: 2 } };
        let noop = RegionEvent { worker: 0, region, outcome: Outcome::NoOp };
        assert_eq!(ok.credited_bytes(), 8192);
        assert_eq!(ok.missed_bytes(), 0);
        assert_eq!(warn.credited_bytes(), 0);
        assert_eq!(warn.missed_bytes(), 8192);
        assert_eq!(noop.credited_bytes() + noop.missed_bytes(), 0);
        assert_eq!(warn.outcome.label(), "WARN");
    }
}
