//! Scheduling delay analysis over fetched reader logs.
//!
//! The reader logs a pickup line carrying each message's scheduled epoch;
//! the delay is the gap between that and the line's own `asctime`.

pub mod extract;
pub mod filter;
pub mod report;

pub use extract::{DelayEntry, Extraction, MessageExtractor, GOT_MESSAGE_PATTERN};
pub use filter::{deduplicate, filter_valid, ValidDelays};
pub use report::{BucketCount, DelayBucket, DelayReport};

use chrono::NaiveDateTime;
use std::time::Duration;

/// Points for the delay chart: scheduled time shifted by `display_offset`
/// against delay in minutes, ordered by scheduled time.
pub fn chart_points(entries: &[DelayEntry], display_offset: Duration) -> Vec<(NaiveDateTime, f64)> {
    let offset = chrono::Duration::from_std(display_offset).unwrap_or_else(|_| chrono::Duration::zero());

    let mut ordered: Vec<&DelayEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.scheduled_time);
    ordered
        .into_iter()
        .map(|entry| (entry.scheduled_time + offset, entry.delay_minutes()))
        .collect()
}
