use super::{banner, CommandError};
use crate::config::SignupDelayConfig;
use crate::render::{
    open_in_viewer, render_timeline, ReferenceLine, RGBColor, TimeAxis, TimelineChart,
};
use crate::signup::{chart_path_for, parse_rows, within_window, DelaySummary, IndicatorSummary};
use crate::source::timestamp::MINUTE_FORMAT;
use crate::source::CsvTable;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_INPUT: &str = "company-sync-export.csv";

const ZERO_LINE: RGBColor = RGBColor(0x80, 0x80, 0x80);
const INDICATOR_COLORS: [RGBColor; 2] = [RGBColor(0x2C, 0xA0, 0x2C), RGBColor(0xFF, 0x7F, 0x0E)];

#[derive(Debug, Clone)]
pub struct SignupDelayArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub show: bool,
}

pub fn run(args: &SignupDelayArgs, config: &SignupDelayConfig) -> Result<(), CommandError> {
    banner("Signup to CRM Sync Delay");

    let table = CsvTable::load(&args.input)?;
    println!("Total rows: {}", table.len());
    println!("Columns: {}", table.headers().join(", "));

    let parsed = parse_rows(&table, config)?;
    if parsed.removed > 0 {
        println!("Removed {} rows with invalid dates", parsed.removed);
    }

    let windowed = within_window(parsed.kept, config.window_start, config.window_end);
    println!(
        "Filtered to {} rows between {} and {} (removed {})",
        windowed.kept.len(),
        config.window_start.format(MINUTE_FORMAT),
        config.window_end.format(MINUTE_FORMAT),
        windowed.removed
    );
    let rows = windowed.kept;

    println!();
    match DelaySummary::from_rows(&rows) {
        Some(summary) => println!("{summary}"),
        None => println!("No records in the selected time window."),
    }

    println!();
    println!(
        "{}",
        IndicatorSummary::from_rows(&rows, config.indicator_start, config.indicator_end)
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| chart_path_for(&args.input));
    render_chart(&rows, config, &output)?;
    println!();
    println!("Graph saved to: {}", output.display());
    info!(path = %output.display(), points = rows.len(), "Rendered signup delay chart");

    if args.show {
        open_in_viewer(&output);
    }
    Ok(())
}

fn render_chart(
    rows: &[crate::signup::SignupRow],
    config: &SignupDelayConfig,
    output: &Path,
) -> Result<(), CommandError> {
    let points: Vec<_> = rows
        .iter()
        .map(|row| (row.signup_time, row.delay_minutes()))
        .collect();

    let vertical = [config.indicator_start, config.indicator_end]
        .into_iter()
        .zip(INDICATOR_COLORS)
        .map(|(at, color)| ReferenceLine {
            at,
            label: at.format(MINUTE_FORMAT).to_string(),
            color,
        })
        .collect();

    let chart = TimelineChart {
        title: "Delay between signup and CRM company creation",
        x_label: "Signup time",
        y_label: "Delay (minutes)",
        axis: TimeAxis {
            start: config.window_start,
            end: config.window_end,
            tick_interval: config.tick_interval,
            label_format: MINUTE_FORMAT.to_string(),
        },
        points: &points,
        connect_points: false,
        horizontal: vec![ReferenceLine {
            at: 0.0,
            label: "Zero difference".to_string(),
            color: ZERO_LINE,
        }],
        vertical,
    };

    render_timeline(&chart, output)?;
    Ok(())
}
