use super::{banner, CommandError};
use crate::config::FetchConfig;
use crate::fetch::{sampling_percent, FetchError, FetchSummary, HttpSearchBackend, LogFetcher};
use crate::source::save_records;
use crate::source::timestamp::format_query_time;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_OUTPUT: &str = "schedule_reader_logs.json";

#[derive(Debug, Clone)]
pub struct FetchLogsArgs {
    pub username: String,
    pub password: String,
    pub output: PathBuf,
}

pub async fn run(args: &FetchLogsArgs, config: &FetchConfig) -> Result<(), CommandError> {
    let backend = HttpSearchBackend::new(config, &args.username, &args.password)
        .map_err(FetchError::from)?;
    let fetcher = LogFetcher::new(backend, config.clone());
    let windows = fetcher.windows();

    banner("Schedule Reader Log Fetch");
    println!(
        "Fetching logs from {} to {}",
        format_query_time(&config.start),
        format_query_time(&config.end)
    );
    println!("Service: {}", config.service_name);
    println!(
        "Sampling: {}s every {}s (~{:.1}% of data)",
        config.sample_duration.as_secs(),
        config.sample_interval.as_secs(),
        sampling_percent(config.sample_interval, config.sample_duration)
    );
    println!("Split into {} sample windows", windows.len());

    let run = fetcher.fetch_all().await;
    if run.failed_windows > 0 {
        warn!(
            failed = run.failed_windows,
            windows = run.windows,
            "Some windows failed; their results are partial or missing"
        );
    }
    info!(
        records = run.records.len(),
        requests = run.requests,
        "Fetch complete"
    );

    save_records(&args.output, &run.records).map_err(FetchError::from)?;
    println!();
    println!("Saved {} logs to {}", run.records.len(), args.output.display());

    println!();
    match FetchSummary::from_records(&run.records) {
        Some(summary) => {
            banner("SUMMARY");
            println!("As of: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
            println!("{summary}");
        }
        None => println!("No logs found."),
    }

    Ok(())
}
