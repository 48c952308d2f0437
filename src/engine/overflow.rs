//! Queue overflow reduction.
//!
//! When a lock's waiter queue grows past its configured bound, the overflow
//! strategy picks which waiters are evicted. Evicted waiters never run and no
//! error is delivered to them.

use crate::config::{LockOptions, OverflowStrategy};
use std::collections::VecDeque;

/// Remove excess waiters from `queue` according to `options`.
///
/// Runs only when the queue is bounded and longer than the bound. The removed
/// entries are returned in queue order so the caller can disarm their timers;
/// survivors keep their relative order.
///
/// - [`OverflowStrategy::This`] removes the newest entry only, however far over
///   the bound the queue is.
/// - [`OverflowStrategy::First`] removes entries from the front until the queue
///   fits the bound.
/// - [`OverflowStrategy::Last`] keeps the newest entry and removes the entries
///   right before it until the queue fits the bound.
pub fn reduce_queue<T>(queue: &mut VecDeque<T>, options: &LockOptions) -> Vec<T> {
    let Some(max) = options.max_queue_size.get() else {
        return Vec::new();
    };
    if queue.len() <= max {
        return Vec::new();
    }

    let excess = queue.len() - max;
    match options.overflow_strategy {
        OverflowStrategy::This => queue.pop_back().into_iter().collect(),
        OverflowStrategy::First => queue.drain(..excess).collect(),
        OverflowStrategy::Last => {
            // max >= 1, so the slot before the newest entry always exists
            let newest = queue.len() - 1;
            queue.drain(newest - excess..newest).collect()
        }
    }
}
