use super::extract::DelayEntry;
use crate::stats;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayBucket {
    UnderOneMinute,
    OneToFiveMinutes,
    FiveToFifteenMinutes,
    FifteenToSixtyMinutes,
    OneToSixHours,
    OverSixHours,
}

impl DelayBucket {
    pub const ALL: [DelayBucket; 6] = [
        DelayBucket::UnderOneMinute,
        DelayBucket::OneToFiveMinutes,
        DelayBucket::FiveToFifteenMinutes,
        DelayBucket::FifteenToSixtyMinutes,
        DelayBucket::OneToSixHours,
        DelayBucket::OverSixHours,
    ];

    /// Upper bounds are exclusive: 60.0 minutes lands in `1-6 hours`.
    pub fn for_minutes(minutes: f64) -> Self {
        if minutes < 1.0 {
            Self::UnderOneMinute
        } else if minutes < 5.0 {
            Self::OneToFiveMinutes
        } else if minutes < 15.0 {
            Self::FiveToFifteenMinutes
        } else if minutes < 60.0 {
            Self::FifteenToSixtyMinutes
        } else if minutes < 360.0 {
            Self::OneToSixHours
        } else {
            Self::OverSixHours
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UnderOneMinute => "< 1 min",
            Self::OneToFiveMinutes => "1-5 min",
            Self::FiveToFifteenMinutes => "5-15 min",
            Self::FifteenToSixtyMinutes => "15-60 min",
            Self::OneToSixHours => "1-6 hours",
            Self::OverSixHours => "> 6 hours",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketCount {
    pub bucket: DelayBucket,
    pub count: usize,
    pub percent: f64,
}

impl BucketCount {
    /// One block per two percentage points.
    pub fn bar(&self) -> String {
        "█".repeat((self.percent / 2.0).floor() as usize)
    }
}

impl fmt::Display for BucketCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {:12}: {:6} ({:5.1}%) {}",
            self.bucket.label(),
            self.count,
            self.percent,
            self.bar()
        )
    }
}

/// Delay statistics in minutes over the retained entries.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayReport {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub p99: f64,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub buckets: Vec<BucketCount>,
}

impl DelayReport {
    /// `None` when there is nothing to report.
    pub fn from_entries(entries: &[DelayEntry]) -> Option<Self> {
        let minutes: Vec<f64> = entries.iter().map(DelayEntry::delay_minutes).collect();
        let sorted = stats::sorted(&minutes);
        let count = sorted.len();

        let buckets = DelayBucket::ALL
            .iter()
            .map(|&bucket| {
                let n = minutes
                    .iter()
                    .filter(|&&m| DelayBucket::for_minutes(m) == bucket)
                    .count();
                BucketCount {
                    bucket,
                    count: n,
                    percent: n as f64 * 100.0 / count.max(1) as f64,
                }
            })
            .collect();

        Some(Self {
            count,
            min: stats::min(&sorted)?,
            max: stats::max(&sorted)?,
            mean: stats::mean(&sorted)?,
            median: stats::upper_median(&sorted)?,
            p90: stats::nearest_rank(&sorted, 0.90)?,
            p99: stats::nearest_rank(&sorted, 0.99)?,
            first_seen: entries.iter().map(|e| e.actual_time).min()?,
            last_seen: entries.iter().map(|e| e.actual_time).max()?,
            buckets,
        })
    }
}

impl fmt::Display for DelayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Delay statistics ({} messages):", self.count)?;
        writeln!(f, "  Min:    {:.2} minutes", self.min)?;
        writeln!(f, "  Max:    {:.2} minutes", self.max)?;
        writeln!(f, "  Mean:   {:.2} minutes", self.mean)?;
        writeln!(f, "  Median: {:.2} minutes", self.median)?;
        writeln!(f, "  P90:    {:.2} minutes", self.p90)?;
        writeln!(f, "  P99:    {:.2} minutes", self.p99)?;
        writeln!(f)?;
        writeln!(f, "Time range: {} to {}", self.first_seen, self.last_seen)?;
        writeln!(f)?;
        write!(f, "Delay distribution:")?;
        for bucket in &self.buckets {
            write!(f, "\n{bucket}")?;
        }
        Ok(())
    }
}
