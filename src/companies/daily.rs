use super::filter::DatedCompany;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Companies per calendar day, ascending by day. Days with no companies are absent.
pub fn daily_counts(companies: &[DatedCompany]) -> Vec<(NaiveDate, usize)> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for company in companies {
        *counts.entry(company.created.date()).or_default() += 1;
    }
    counts.into_iter().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub days: usize,
    pub mean_per_day: f64,
    pub peak_count: usize,
    /// Earliest day reaching `peak_count`.
    pub peak_day: NaiveDate,
}

impl DailySummary {
    pub fn from_counts(counts: &[(NaiveDate, usize)]) -> Option<Self> {
        let (first_day, _) = *counts.first()?;
        let (last_day, _) = *counts.last()?;
        let (peak_day, peak_count) = counts
            .iter()
            .copied()
            .fold(None, |best: Option<(NaiveDate, usize)>, (day, n)| match best {
                Some((_, top)) if top >= n => best,
                _ => Some((day, n)),
            })?;
        let total: usize = counts.iter().map(|(_, n)| n).sum();

        Some(Self {
            first_day,
            last_day,
            days: counts.len(),
            mean_per_day: total as f64 / counts.len() as f64,
            peak_count,
            peak_day,
        })
    }
}

impl fmt::Display for DailySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Date range: {} to {}", self.first_day, self.last_day)?;
        writeln!(f, "Total days with signups: {}", self.days)?;
        writeln!(f, "Average companies per day: {:.1}", self.mean_per_day)?;
        write!(
            f,
            "Max companies in a day: {} on {}",
            self.peak_count, self.peak_day
        )
    }
}
