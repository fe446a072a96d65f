//! Single producer feeding eligible regions to the worker pool

use crossbeam_channel::Sender;
use log::debug;

use crate::domain::Region;
use crate::split::eligible;

/// Send every eligible region, in sequence order, then close the queue
///
/// Dropping `tx` on return is what tells the workers there is nothing left.
/// Returns the number of regions handed off.
pub fn dispatch(regions: &[Region], tx: Sender<Region>) -> usize {
    let mut sent = 0;
    for region in eligible(regions) {
        if tx.send(*region).is_err() {
            // Every worker is gone; nobody is left to take the rest
            break;
        }
        sent += 1;
    }
    debug!("dispatcher: {sent} regions sent, closing queue");
    sent
}
