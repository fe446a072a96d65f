//! Byte accounting across the worker pool
//!
//! Workers only ever add to [`RunCounters`]; the totals are read once, after
//! every worker has been joined, to build the [`RunReport`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::{Pid, SplitThreshold};
use crate::report::{OutcomeCounts, RegionEvent, RunReport};
use crate::split::SplitStats;

/// Lock-free byte counters shared by the workers of one run
#[derive(Debug, Default)]
pub struct RunCounters {
    recovered: AtomicU64,
    unrecovered: AtomicU64,
}

impl RunCounters {
    pub fn record(&self, event: &RegionEvent) {
        // Relaxed is enough: totals are only read after the pool is joined
        self.recovered.fetch_add(event.credited_bytes(), Ordering::Relaxed);
        self.unrecovered.fetch_add(event.missed_bytes(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn recovered(&self) -> u64 {
        self.recovered.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn unrecovered(&self) -> u64 {
        self.unrecovered.load(Ordering::Relaxed)
    }
}

/// Events collected on the caller's thread while the pool runs
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<RegionEvent>,
    pub outcomes: OutcomeCounts,
}

impl EventLog {
    pub fn push(&mut self, event: RegionEvent) {
        self.outcomes.record(&event.outcome);
        self.events.push(event);
    }
}

/// Everything known about a run before any region is dispatched
#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    pub pid: Pid,
    pub dry_run: bool,
    pub workers: usize,
    pub split_threshold: SplitThreshold,
    pub swapped_bytes: u64,
    pub scanned_regions: usize,
    pub split: SplitStats,
    pub expected_bytes: u64,
    pub eligible_regions: usize,
}

/// Run-scoped owner of the counters and the collected events
#[derive(Debug, Default)]
pub struct Aggregator {
    pub counters: RunCounters,
    pub log: EventLog,
}

impl Aggregator {
    /// Combine the plan with what the workers reported
    #[must_use]
    pub fn into_report(self, plan: RunPlan, elapsed: Duration) -> RunReport {
        RunReport {
            pid: plan.pid,
            dry_run: plan.dry_run,
            workers: plan.workers,
            split_threshold: plan.split_threshold,
            swapped_bytes: plan.swapped_bytes,
            scanned_regions: plan.scanned_regions,
            split: plan.split,
            expected_bytes: plan.expected_bytes,
            eligible_regions: plan.eligible_regions,
            recovered_bytes: self.counters.recovered(),
            unrecovered_bytes: self.counters.unrecovered(),
            outcomes: self.log.outcomes,
            events: self.log.events,
            elapsed,
        }
    }
}
