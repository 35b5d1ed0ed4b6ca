use crate::source::timestamp::{parse_asctime, parse_epoch_seconds, seconds_between};
use crate::source::LogRecord;
use chrono::NaiveDateTime;
use regex::Regex;
use std::fmt;
use tracing::debug;

/// Matches the reader's pickup line, e.g.
/// `Got message b'1b7c…' with schedule_timestamp 1765827000.25`.
pub const GOT_MESSAGE_PATTERN: &str =
    r"Got message b?'([^']+)' with schedule_timestamp (\d+\.?\d*)";

/// One scheduled message as observed by the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayEntry {
    pub identifier: String,
    /// When the message was due (UTC).
    pub scheduled_time: NaiveDateTime,
    /// When the reader logged picking it up (UTC).
    pub actual_time: NaiveDateTime,
    pub delay_seconds: f64,
}

impl DelayEntry {
    pub fn new(identifier: String, scheduled_time: NaiveDateTime, actual_time: NaiveDateTime) -> Self {
        Self {
            identifier,
            scheduled_time,
            actual_time,
            delay_seconds: seconds_between(scheduled_time, actual_time),
        }
    }

    pub fn delay_minutes(&self) -> f64 {
        self.delay_seconds / 60.0
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub entries: Vec<DelayEntry>,
    /// Records without an `asctime` value.
    pub missing_asctime: usize,
    /// Records whose message is not a pickup line.
    pub unmatched: usize,
    /// Pickup lines whose asctime or schedule timestamp could not be parsed.
    pub unparseable: usize,
}

impl Extraction {
    /// Records whose message was a pickup line, parseable or not.
    pub fn pickup_lines(&self) -> usize {
        self.entries.len() + self.unparseable
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} 'Got message' entries", self.pickup_lines())?;
        let skipped = [
            (self.missing_asctime, "without asctime"),
            (self.unmatched, "without a 'Got message' line"),
            (self.unparseable, "with unparseable timestamps"),
        ];
        for (count, reason) in skipped {
            if count > 0 {
                writeln!(f, "Skipped {count} records {reason}")?;
            }
        }
        write!(f, "Extracted {} delay entries", self.entries.len())
    }
}

#[derive(Debug)]
pub struct MessageExtractor {
    pattern: Regex,
}

impl MessageExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(GOT_MESSAGE_PATTERN)?,
        })
    }

    /// Pull `(identifier, schedule_timestamp)` out of a message, if it is a pickup line.
    pub fn match_message<'t>(&self, message: &'t str) -> Option<(&'t str, &'t str)> {
        let caps = self.pattern.captures(message)?;
        Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
    }

    pub fn extract(&self, records: &[LogRecord]) -> Extraction {
        let mut out = Extraction::default();

        for record in records {
            let Some(asctime) = record.asctime.as_deref().filter(|s| !s.is_empty()) else {
                out.missing_asctime += 1;
                continue;
            };

            let message = record.message.as_deref().unwrap_or_default();
            let Some((identifier, schedule_ts)) = self.match_message(message) else {
                out.unmatched += 1;
                continue;
            };

            let actual_time = match parse_asctime(asctime) {
                Ok(t) => t,
                Err(e) => {
                    debug!(asctime, error = %e, "Skipping record with unparseable asctime");
                    out.unparseable += 1;
                    continue;
                }
            };

            let scheduled_time = match schedule_ts
                .parse::<f64>()
                .ok()
                .and_then(|secs| parse_epoch_seconds(secs).ok())
            {
                Some(t) => t,
                None => {
                    debug!(schedule_ts, "Skipping record with unparseable schedule timestamp");
                    out.unparseable += 1;
                    continue;
                }
            };

            out.entries
                .push(DelayEntry::new(identifier.to_string(), scheduled_time, actual_time));
        }

        out
    }
}
