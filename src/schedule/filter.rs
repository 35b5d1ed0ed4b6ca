use super::extract::DelayEntry;
use crate::filter::Filtered;
use std::collections::HashSet;

/// Keep the first entry seen for each identifier, preserving input order.
pub fn deduplicate(entries: Vec<DelayEntry>) -> Filtered<DelayEntry> {
    let mut seen = HashSet::new();
    Filtered::retain(entries, |entry| seen.insert(entry.identifier.clone()))
}

/// Entries with a plausible delay, plus what was dropped and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDelays {
    pub kept: Vec<DelayEntry>,
    /// Picked up before their scheduled time.
    pub future: usize,
    /// Delay above the configured maximum.
    pub too_large: usize,
}

/// Drop negative delays and delays above `max_delay_seconds`. Zero is kept.
pub fn filter_valid(entries: Vec<DelayEntry>, max_delay_seconds: f64) -> ValidDelays {
    let mut future = 0;
    let mut too_large = 0;
    let mut kept = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.delay_seconds < 0.0 {
            future += 1;
        } else if entry.delay_seconds > max_delay_seconds {
            too_large += 1;
        } else {
            kept.push(entry);
        }
    }

    ValidDelays {
        kept,
        future,
        too_large,
    }
}
