use crate::source::LogRecord;
use std::fmt;

pub const UNKNOWN: &str = "UNKNOWN";

/// Count values by key, sorted by count descending. Ties keep first-seen order.
fn count_by<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Overview of a fetched log set.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub total: usize,
    pub by_level: Vec<(String, usize)>,
    pub by_deployment: Vec<(String, usize)>,
    /// Lexicographic min/max of the timestamps present.
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
}

impl FetchSummary {
    /// `None` for an empty log set.
    pub fn from_records(records: &[LogRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let timestamps = || {
            records
                .iter()
                .filter_map(|r| r.timestamp.as_deref())
                .filter(|t| !t.is_empty())
        };

        Some(Self {
            total: records.len(),
            by_level: count_by(records.iter().map(|r| r.level.as_deref().unwrap_or(UNKNOWN))),
            by_deployment: count_by(
                records
                    .iter()
                    .map(|r| r.deployment.as_deref().unwrap_or(UNKNOWN)),
            ),
            first_timestamp: timestamps().min().map(str::to_string),
            last_timestamp: timestamps().max().map(str::to_string),
        })
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total logs: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "By log level:")?;
        for (level, count) in &self.by_level {
            writeln!(f, "  {level}: {count}")?;
        }
        writeln!(f)?;
        write!(f, "By deployment:")?;
        for (deployment, count) in &self.by_deployment {
            write!(f, "\n  {deployment}: {count}")?;
        }
        if let (Some(first), Some(last)) = (&self.first_timestamp, &self.last_timestamp) {
            write!(f, "\n\nTime range:\n  First log: {first}\n  Last log: {last}")?;
        }
        Ok(())
    }
}
