//! # Swap-in engine
//!
//! ```text
//!  smaps ──▶ scan ──▶ split ──▶ dispatcher ══▶ worker 0 ─┐
//!                                    (bounded)  ║  worker 1 ─┼──▶ events ──▶ aggregator
//!                                               ╚▶ worker N ─┘
//! ```
//!
//! One producer thread streams eligible regions over a zero-capacity channel,
//! so it only gets ahead of the pool by the region currently being handed off.
//! Workers report each region's outcome over a second channel to the calling
//! thread, which forwards it to the observer and keeps it for the report. The
//! run ends when every worker has been joined.
//!
//! [`prepare`] does the scanning and splitting up front, so callers can show the
//! [`RunPlan`] before [`Prepared::execute`] starts reading.

pub mod aggregator;
pub mod dispatcher;
pub mod memory;
pub mod worker;

use crossbeam_channel::{bounded, unbounded};
use log::debug;
use std::num::NonZeroUsize;
use std::thread;
use std::time::Instant;

use crate::domain::{ConfigError, DeswapError, Region, ScanError, SplitThreshold, TargetProcess};
use crate::report::{RegionEvent, RunReport};
use crate::smaps::scan_smaps;
use crate::split::{eligible, split_regions};

pub use aggregator::{Aggregator, RunCounters, RunPlan};
pub use memory::{page_size, MemorySource, ProcMem};
pub use worker::{yank_region, Worker};

/// Core settings for one run, already validated
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub workers: NonZeroUsize,
    pub threshold: SplitThreshold,
    pub dry_run: bool,
    /// Read chunk size; the system page size unless overridden
    pub page_size: NonZeroUsize,
}

impl RunConfig {
    /// # Errors
    /// Returns [`ConfigError::ZeroWorkers`] when `workers` is 0
    pub fn new(workers: usize, threshold: SplitThreshold, dry_run: bool) -> Result<Self, ConfigError> {
        let workers = NonZeroUsize::new(workers).ok_or(ConfigError::ZeroWorkers)?;
        Ok(Self { workers, threshold, dry_run, page_size: page_size() })
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::MIN,
            threshold: SplitThreshold::default(),
            dry_run: false,
            page_size: page_size(),
        }
    }
}

/// Swap a live process back in and check that every swapped byte was recovered
///
/// # Errors
/// - [`DeswapError::Scan`] if `/proc/<pid>/smaps` cannot be read
/// - [`DeswapError::Consistency`] if some regions could not be read back
pub fn deswap(
    target: &TargetProcess,
    config: &RunConfig,
    observer: impl FnMut(&RegionEvent),
) -> Result<RunReport, DeswapError> {
    let report = swap_in(target, &ProcMem::for_target(target), config, observer)?;
    report.verify()?;
    Ok(report)
}

/// Scan, split and yank every swapped region of `target` through `source`
///
/// The returned report has not been verified; call [`RunReport::verify`] for the
/// pass/fail decision.
///
/// # Errors
/// Returns [`ScanError`] if the mapping descriptor cannot be read; nothing is dispatched then
pub fn swap_in<M: MemorySource>(
    target: &TargetProcess,
    source: &M,
    config: &RunConfig,
    observer: impl FnMut(&RegionEvent),
) -> Result<RunReport, ScanError> {
    Ok(prepare(target, config)?.execute(source, observer))
}

/// A scanned and split region sequence, not yet dispatched
#[derive(Debug)]
pub struct Prepared {
    pub plan: RunPlan,
    pub regions: Vec<Region>,
    config: RunConfig,
    started: Instant,
}

/// Scan and split `target`'s swapped regions without touching its memory
///
/// # Errors
/// Returns [`ScanError`] if the mapping descriptor cannot be read
pub fn prepare(target: &TargetProcess, config: &RunConfig) -> Result<Prepared, ScanError> {
    let started = Instant::now();
    let smaps = target.smaps_path();

    let scanned = scan_smaps(smaps)?;
    let swapped_bytes: u64 = scanned.iter().map(|r| r.swapped_bytes).sum();
    let scanned_regions = scanned.len();

    let (regions, split) = split_regions(scanned, config.threshold);
    let expected_bytes: u64 = eligible(&regions).map(|r| r.swapped_bytes).sum();
    let eligible_regions = eligible(&regions).count();
    debug!(
        "{}: in-swap: {swapped_bytes} B in {scanned_regions} regions, \
         to-read: {expected_bytes} B in {eligible_regions}",
        smaps.display()
    );

    let plan = RunPlan {
        pid: target.pid(),
        dry_run: config.dry_run,
        workers: config.workers.get(),
        split_threshold: config.threshold,
        swapped_bytes,
        scanned_regions,
        split,
        expected_bytes,
        eligible_regions,
    };

    Ok(Prepared { plan, regions, config: *config, started })
}

impl Prepared {
    /// Dispatch the prepared regions to the worker pool and collect the report
    pub fn execute<M: MemorySource>(
        self,
        source: &M,
        observer: impl FnMut(&RegionEvent),
    ) -> RunReport {
        let aggregator = run_pool(&self.regions, source, &self.config, observer);
        aggregator.into_report(self.plan, self.started.elapsed())
    }
}

/// Dispatch `regions` to a pool of `config.workers` yank workers and wait for all of them
pub fn run_pool<M: MemorySource>(
    regions: &[Region],
    source: &M,
    config: &RunConfig,
    mut observer: impl FnMut(&RegionEvent),
) -> Aggregator {
    let mut aggregator = Aggregator::default();
    let counters = &aggregator.counters;
    let log = &mut aggregator.log;

    let (region_tx, region_rx) = bounded::<Region>(0);
    let (event_tx, event_rx) = unbounded::<RegionEvent>();

    thread::scope(|scope| {
        scope.spawn(move || dispatcher::dispatch(regions, region_tx));

        for id in 0..config.workers.get() {
            let worker = Worker {
                id,
                source,
                page_size: config.page_size,
                dry_run: config.dry_run,
                counters,
            };
            let region_rx = region_rx.clone();
            let event_tx = event_tx.clone();
            scope.spawn(move || worker.run(&region_rx, &event_tx));
        }

        // Only the workers may hold these now, so the event loop below ends
        // once the last of them exits.
        drop(region_rx);
        drop(event_tx);

        for event in event_rx {
            observer(&event);
            log.push(event);
        }
    });

    aggregator
}
