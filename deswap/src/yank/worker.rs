//! Yank workers
//!
//! A worker takes regions off the queue until it is closed. For each one it
//! opens the memory interface, seeks to the region start and reads it page by
//! page. The data is thrown away; the point is the page faults the reads cause.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace};
use std::io::{self, Read, Seek, SeekFrom};
use std::num::NonZeroUsize;

use super::aggregator::RunCounters;
use super::memory::MemorySource;
use crate::domain::{Region, RegionError};
use crate::report::{FailedStage, Outcome, RegionEvent};

/// Chunk counts for one region's read loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadTally {
    pub read: u64,
    pub failed: u64,
}

impl ReadTally {
    #[must_use]
    pub fn attempted(&self) -> u64 {
        self.read + self.failed
    }
}

/// One member of the pool; borrows everything it shares with its siblings
pub struct Worker<'a, M: MemorySource> {
    pub id: usize,
    pub source: &'a M,
    pub page_size: NonZeroUsize,
    pub dry_run: bool,
    pub counters: &'a RunCounters,
}

impl<M: MemorySource> Worker<'_, M> {
    /// Drain `regions` until the producer closes it, reporting each outcome on `events`
    pub fn run(&self, regions: &Receiver<Region>, events: &Sender<RegionEvent>) {
        let mut buf = vec![0u8; self.page_size.get()];
        let mut handled = 0usize;

        for region in regions {
            let outcome = if self.dry_run {
                Outcome::NoOp
            } else {
                yank_region(self.source, &region, &mut buf)
            };

            debug!("worker {}: {region}: {}", self.id, outcome.label());

            let event = RegionEvent { worker: self.id, region, outcome };
            self.counters.record(&event);
            handled += 1;

            if events.send(event).is_err() {
                break;
            }
        }

        debug!("worker {}: queue closed after {handled} regions", self.id);
    }
}

/// Read one region back through a fresh handle from `source`
///
/// `buf` sets the chunk size, normally one page.
pub fn yank_region<M: MemorySource>(source: &M, region: &Region, buf: &mut [u8]) -> Outcome {
    let mut handle = match open_at(source, region.offset) {
        Ok(handle) => handle,
        Err(err) => {
            let stage = match err {
                RegionError::Open(_) => FailedStage::Open,
                RegionError::Seek { .. } => FailedStage::Seek,
            };
            return Outcome::Err { stage, error: err.to_string() };
        }
    };

    let tally = read_through(&mut handle, region, buf);
    if tally.failed > 0 {
        Outcome::Warn { failed: tally.failed, attempted: tally.attempted() }
    } else {
        Outcome::Ok { chunks: tally.read }
    }
}

fn open_at<M: MemorySource>(source: &M, offset: u64) -> Result<M::Handle, RegionError> {
    let mut handle = source.open().map_err(RegionError::Open)?;
    handle.seek(SeekFrom::Start(offset)).map_err(|source| RegionError::Seek { offset, source })?;
    Ok(handle)
}

/// Read `[offset, end)` sequentially from a handle already positioned at `offset`
///
/// A failed chunk is skipped: the cursor moves past it and the handle is
/// re-seeked, since a failed read leaves the stream position where it was.
/// End of stream stops the loop without counting as a failure. An empty `buf`
/// cannot read anything, so the region counts as one failed chunk.
pub fn read_through<H: Read + Seek>(handle: &mut H, region: &Region, buf: &mut [u8]) -> ReadTally {
    let chunk = buf.len() as u64;
    let mut tally = ReadTally::default();
    if chunk == 0 {
        tally.failed = 1;
        return tally;
    }
    let mut cursor = region.offset;

    while cursor < region.end {
        let want = usize::try_from(region.end - cursor).map_or(buf.len(), |left| left.min(buf.len()));

        match handle.read(&mut buf[..want]) {
            Ok(0) => {
                trace!("{region}: end of stream at 0x{cursor:012x}");
                break;
            }
            Ok(n) => {
                trace!(
                    "{region}: read(from=0x{cursor:012x}, to=0x{:012x}): got/exp: {n}/{want} B",
                    cursor + n as u64
                );
                tally.read += 1;
                cursor += n as u64;
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                trace!("{region}: read at 0x{cursor:012x} failed: {err}");
                tally.failed += 1;
                cursor += want as u64;
                if cursor < region.end {
                    if let Err(err) = handle.seek(SeekFrom::Start(cursor)) {
                        trace!("{region}: re-seek to 0x{cursor:012x} failed: {err}");
                        tally.failed += (region.end - cursor).div_ceil(chunk);
                        break;
                    }
                }
            }
        }
    }

    tally
}
