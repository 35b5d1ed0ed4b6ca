//! Signup-to-sync delay from a CRM company export.
//!
//! Each row carries the moment a company signed up and the moment the CRM
//! created its record; the delay between the two is what the report and
//! chart are about.

use crate::config::SignupDelayConfig;
use crate::filter::Filtered;
use crate::source::timestamp::{minutes_between, parse_strptime};
use crate::source::{CsvTable, TableError};
use crate::stats;
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignupRow {
    pub signup_time: NaiveDateTime,
    pub create_time: NaiveDateTime,
}

impl SignupRow {
    /// Create time minus signup time, in fractional minutes.
    pub fn delay_minutes(&self) -> f64 {
        minutes_between(self.signup_time, self.create_time)
    }
}

/// Parse both timestamp columns; rows where either fails are dropped.
pub fn parse_rows(
    table: &CsvTable,
    config: &SignupDelayConfig,
) -> Result<Filtered<SignupRow>, TableError> {
    let signup = table.column(&config.signup_column)?;
    let create = table.column(&config.create_column)?;

    let mut kept = Vec::with_capacity(table.len());
    let mut removed = 0;
    for (signup_cell, create_cell) in table.cell_pairs(signup, create) {
        let parse = |cell: Option<&str>| {
            cell.and_then(|value| parse_strptime(value, &config.timestamp_format).ok())
        };
        match (parse(signup_cell), parse(create_cell)) {
            (Some(signup_time), Some(create_time)) => kept.push(SignupRow {
                signup_time,
                create_time,
            }),
            _ => removed += 1,
        }
    }

    Ok(Filtered { kept, removed })
}

/// Keep rows whose signup time lies in `[start, end]`, bounds included.
pub fn within_window(
    rows: Vec<SignupRow>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Filtered<SignupRow> {
    Filtered::retain(rows, |row| row.signup_time >= start && row.signup_time <= end)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelaySummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl DelaySummary {
    pub fn from_rows(rows: &[SignupRow]) -> Option<Self> {
        let delays: Vec<f64> = rows.iter().map(SignupRow::delay_minutes).collect();
        Some(Self {
            count: delays.len(),
            mean: stats::mean(&delays)?,
            median: stats::median(&delays)?,
            min: stats::min(&delays)?,
            max: stats::max(&delays)?,
        })
    }
}

impl fmt::Display for DelaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time difference statistics:")?;
        writeln!(f, "  Mean: {:.2} minutes", self.mean)?;
        writeln!(f, "  Median: {:.2} minutes", self.median)?;
        writeln!(f, "  Min: {:.2} minutes", self.min)?;
        write!(f, "  Max: {:.2} minutes", self.max)
    }
}

/// Mean delay for signups between the two indicator markers, bounds included.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub count: usize,
    pub mean: Option<f64>,
}

impl IndicatorSummary {
    pub fn from_rows(rows: &[SignupRow], start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let delays: Vec<f64> = rows
            .iter()
            .filter(|row| row.signup_time >= start && row.signup_time <= end)
            .map(SignupRow::delay_minutes)
            .collect();

        Self {
            start,
            end,
            count: delays.len(),
            mean: stats::mean(&delays),
        }
    }
}

impl fmt::Display for IndicatorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start.format(crate::source::timestamp::MINUTE_FORMAT);
        let end = self.end.format(crate::source::timestamp::MINUTE_FORMAT);
        match self.mean {
            Some(mean) => {
                writeln!(f, "Average delay between indicators ({start} and {end}):")?;
                writeln!(f, "  Records: {}", self.count)?;
                write!(f, "  Average delay: {mean:.2} minutes")
            }
            None => write!(f, "No records found between indicators ({start} and {end})"),
        }
    }
}

/// Chart path next to the input: `export.csv` becomes `export_graph.svg`.
pub fn chart_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signup_delay".to_string());
    input.with_file_name(format!("{stem}_graph.svg"))
}
