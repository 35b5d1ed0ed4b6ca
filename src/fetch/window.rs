use crate::source::timestamp::format_query_time;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// A half-open sampling window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            format_query_time(&self.start),
            format_query_time(&self.end)
        )
    }
}

/// Sample `[start, end)` with a window of `duration` every `interval`.
///
/// The last window is clipped to `end`. A zero interval yields no windows.
pub fn generate_windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    duration: Duration,
) -> Vec<TimeWindow> {
    let (Ok(interval), Ok(duration)) = (
        chrono::Duration::from_std(interval),
        chrono::Duration::from_std(duration),
    ) else {
        return Vec::new();
    };
    if interval <= chrono::Duration::zero() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut current = start;
    while current < end {
        windows.push(TimeWindow {
            start: current,
            end: (current + duration).min(end),
        });
        current += interval;
    }
    windows
}

/// Share of the range covered by the windows, as a percentage.
pub fn sampling_percent(interval: Duration, duration: Duration) -> f64 {
    if interval.is_zero() {
        return 0.0;
    }
    duration.as_secs_f64() / interval.as_secs_f64() * 100.0
}
