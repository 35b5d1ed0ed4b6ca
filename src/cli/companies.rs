use super::{banner, CommandError};
use crate::companies::{daily_counts, load_companies, CompanyFilterReport, DailySummary};
use crate::config::CompaniesConfig;
use crate::render::{open_in_viewer, render_daily_bars, DailyBarChart};
use crate::source::CsvTable;
use chrono::{DateTime, Local, TimeZone};
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_INPUT: &str = "all-companies-export.csv";
pub const DEFAULT_OUTPUT: &str = "companies_by_date_histogram.svg";

#[derive(Debug, Clone)]
pub struct CompaniesArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub show: bool,
}

/// Run against the local wall-clock "now".
pub fn run(args: &CompaniesArgs, config: &CompaniesConfig) -> Result<(), CommandError> {
    run_as_of(args, config, Local::now())
}

pub fn run_as_of<Tz: TimeZone>(
    args: &CompaniesArgs,
    config: &CompaniesConfig,
    as_of: DateTime<Tz>,
) -> Result<(), CommandError> {
    banner("Company Analysis by Creation Date");

    let table = CsvTable::load(&args.input)?;
    let records = load_companies(&table, config)?;
    let report = CompanyFilterReport::run(records, config, as_of);
    println!("{report}");

    let counts = daily_counts(&report.companies);
    println!();
    let Some(summary) = DailySummary::from_counts(&counts) else {
        println!("No companies left after filtering.");
        return Ok(());
    };
    println!("{summary}");

    let chart = DailyBarChart {
        title: "Companies Created Per Day (Filtered)",
        x_label: "Create Date",
        y_label: "Number of Companies",
        bars: &counts,
    };
    render_daily_bars(&chart, &args.output)?;
    println!();
    println!("Histogram saved to: {}", args.output.display());
    info!(path = %args.output.display(), days = counts.len(), "Rendered company histogram");

    if args.show {
        open_in_viewer(&args.output);
    }
    Ok(())
}
