use crate::config::CompaniesConfig;
use crate::filter::Filtered;
use crate::source::timestamp::parse_flexible_in;
use crate::source::{CsvTable, TableError};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use std::fmt;
use tracing::debug;

/// A company row as exported, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub name: Option<String>,
    pub create_date: Option<String>,
}

/// A company that survived name filtering and has a parsed creation date.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedCompany {
    pub name: String,
    pub created: NaiveDateTime,
}

pub fn load_companies(
    table: &CsvTable,
    config: &CompaniesConfig,
) -> Result<Vec<CompanyRecord>, TableError> {
    let name = table.column(&config.name_column)?;
    let date = table.column(&config.date_column)?;

    Ok(table
        .cell_pairs(name, date)
        .map(|(name, date)| CompanyRecord {
            name: name.map(str::to_string),
            create_date: date.map(str::to_string),
        })
        .collect())
}

pub fn drop_blank_names(records: Vec<CompanyRecord>) -> Filtered<CompanyRecord> {
    Filtered::retain(records, |r| {
        r.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    })
}

/// Drop names equal to an excluded name after trimming and lower-casing.
pub fn drop_excluded_names(
    records: Vec<CompanyRecord>,
    excluded: &[String],
) -> Filtered<CompanyRecord> {
    let excluded: Vec<String> = excluded.iter().map(|n| n.trim().to_lowercase()).collect();
    Filtered::retain(records, |r| {
        let name = r.name.as_deref().unwrap_or_default().trim().to_lowercase();
        !excluded.contains(&name)
    })
}

/// Drop names containing `substring`, case-insensitively. An empty substring drops nothing.
pub fn drop_containing(records: Vec<CompanyRecord>, substring: &str) -> Filtered<CompanyRecord> {
    let needle = substring.to_lowercase();
    if needle.is_empty() {
        return Filtered { kept: records, removed: 0 };
    }
    Filtered::retain(records, |r| {
        !r.name
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(&needle)
    })
}

/// Parse creation dates, reading zoned values as wall-clock time in `zone`.
pub fn parse_dates<Tz: TimeZone>(
    records: Vec<CompanyRecord>,
    zone: &Tz,
) -> Filtered<DatedCompany> {
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = 0;

    for record in records {
        let created = record
            .create_date
            .as_deref()
            .map(|date| parse_flexible_in(date, zone))
            .transpose();
        match created {
            Ok(Some(created)) => kept.push(DatedCompany {
                name: record.name.unwrap_or_default(),
                created,
            }),
            Ok(None) => removed += 1,
            Err(e) => {
                debug!(error = %e, "Dropping company with unparseable create date");
                removed += 1;
            }
        }
    }

    Filtered { kept, removed }
}

/// Keep companies created at or after `cutoff`.
pub fn created_since(records: Vec<DatedCompany>, cutoff: NaiveDateTime) -> Filtered<DatedCompany> {
    Filtered::retain(records, |c| c.created >= cutoff)
}

/// Survivors of the full pipeline, with the count each step removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyFilterReport {
    pub companies: Vec<DatedCompany>,
    pub loaded: usize,
    pub blank_names: usize,
    pub excluded_names: usize,
    pub excluded_substring: usize,
    pub invalid_dates: usize,
    pub too_old: usize,
    pub as_of: NaiveDateTime,
    pub cutoff: NaiveDateTime,
    pub lookback_days: u64,
    excluded_list: Vec<String>,
    substring: String,
}

impl CompanyFilterReport {
    /// Creation dates and the lookback cutoff are compared as wall-clock time
    /// in `as_of`'s zone.
    pub fn run<Tz: TimeZone>(
        records: Vec<CompanyRecord>,
        config: &CompaniesConfig,
        as_of: DateTime<Tz>,
    ) -> Self {
        let loaded = records.len();
        let zone = as_of.timezone();
        let as_of = as_of.naive_local();
        let cutoff = chrono::Duration::from_std(config.lookback)
            .ok()
            .and_then(|lookback| as_of.checked_sub_signed(lookback))
            .unwrap_or(NaiveDateTime::MIN);

        let blank = drop_blank_names(records);
        let exact = drop_excluded_names(blank.kept, &config.excluded_names);
        let substring = drop_containing(exact.kept, &config.excluded_substring);
        let dated = parse_dates(substring.kept, &zone);
        let recent = created_since(dated.kept, cutoff);

        Self {
            companies: recent.kept,
            loaded,
            blank_names: blank.removed,
            excluded_names: exact.removed,
            excluded_substring: substring.removed,
            invalid_dates: dated.removed,
            too_old: recent.removed,
            as_of,
            cutoff,
            lookback_days: config.lookback.as_secs() / 86_400,
            excluded_list: config.excluded_names.clone(),
            substring: config.excluded_substring.clone(),
        }
    }

    pub fn final_percent(&self) -> f64 {
        if self.loaded == 0 {
            return 0.0;
        }
        self.companies.len() as f64 * 100.0 / self.loaded as f64
    }
}

impl fmt::Display for CompanyFilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .excluded_list
            .iter()
            .map(|n| format!("'{n}'"))
            .collect::<Vec<_>>()
            .join(", ");
        let steps = [
            ("empty names".to_string(), self.blank_names),
            (names, self.excluded_names),
            (format!("'{}' names", self.substring), self.excluded_substring),
            ("unparseable create dates".to_string(), self.invalid_dates),
        ];

        writeln!(f, "Total companies loaded: {}", self.loaded)?;
        let mut remaining = self.loaded;
        for (label, removed) in &steps {
            remaining -= removed;
            writeln!(f, "After removing {label}: {remaining} (removed {removed})")?;
        }
        remaining -= self.too_old;
        writeln!(
            f,
            "After filtering to last {} days (since {}, as of {}): {} (removed {})",
            self.lookback_days,
            self.cutoff.format("%Y-%m-%d %H:%M"),
            self.as_of.format("%Y-%m-%d %H:%M"),
            remaining,
            self.too_old
        )?;
        writeln!(f)?;
        write!(
            f,
            "Final count: {} companies ({:.1}% of original)",
            self.companies.len(),
            self.final_percent()
        )
    }
}
