//! Region splitting
//!
//! Large swapped regions are broken into bounded children so that several yank
//! workers can share the work of a single mapping. The parent stays in the
//! sequence, flagged as split, directly followed by its children, so the
//! dispatch order still follows the descriptor order.

use log::debug;
use serde::Serialize;

use crate::domain::{Region, SplitThreshold};
use crate::units::format_bytes;

/// Counters describing one splitting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    /// Regions handed to the splitter
    pub initial: usize,
    /// Regions broken up (now split parents)
    pub broken: usize,
    /// Children produced from the broken regions
    pub children: usize,
    /// Regions left as they were
    pub skipped: usize,
}

/// Split every region whose swapped size exceeds `threshold`
///
/// A disabled threshold returns the sequence untouched.
#[must_use]
pub fn split_regions(regions: Vec<Region>, threshold: SplitThreshold) -> (Vec<Region>, SplitStats) {
    let mut stats = SplitStats { initial: regions.len(), ..SplitStats::default() };

    if threshold.is_disabled() {
        stats.skipped = regions.len();
        return (regions, stats);
    }

    let step = threshold.bytes();
    let mut out = Vec::with_capacity(regions.len());

    for mut region in regions {
        if region.split || region.swapped_bytes <= step {
            stats.skipped += 1;
            out.push(region);
            continue;
        }

        region.split = true;
        out.push(region);
        let before = out.len();
        out.extend(split_children(&region, step));
        stats.broken += 1;
        stats.children += out.len() - before;
    }

    debug!(
        "split: init: {}, brk: {}, big: {}, skip: {}, overflow: {}",
        stats.initial,
        stats.broken,
        stats.children,
        stats.skipped,
        format_bytes(step)
    );

    (out, stats)
}

/// Contiguous children of `step` bytes covering `[offset, end)`; the last one may be shorter
fn split_children(parent: &Region, step: u64) -> impl Iterator<Item = Region> {
    let end = parent.end;
    let mut cursor = parent.offset;
    std::iter::from_fn(move || {
        if cursor >= end {
            return None;
        }
        let child_end = cursor.saturating_add(step).min(end);
        let child = Region::new(cursor, child_end, child_end - cursor);
        cursor = child_end;
        Some(child)
    })
}

/// Regions that go to the workers: unsplit originals and split children
pub fn eligible(regions: &[Region]) -> impl Iterator<Item = &Region> {
    regions.iter().filter(|region| region.is_eligible())
}
