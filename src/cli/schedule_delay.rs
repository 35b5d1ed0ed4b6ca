use super::{banner, CommandError};
use crate::config::ScheduleDelayConfig;
use crate::render::{open_in_viewer, render_timeline, TimeAxis, TimelineChart};
use crate::schedule::{chart_points, deduplicate, filter_valid, DelayReport, MessageExtractor};
use crate::source::load_records;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_INPUT: &str = "schedule_reader_logs.json";
pub const DEFAULT_OUTPUT: &str = "schedule_delay_plot.svg";

const TICK_FORMAT: &str = "%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct ScheduleDelayArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dedup: bool,
    pub show: bool,
}

pub fn run(args: &ScheduleDelayArgs, config: &ScheduleDelayConfig) -> Result<(), CommandError> {
    banner("Schedule Reader Delay Analysis");

    let records = load_records(&args.input)?;
    println!("Loaded {} log records from {}", records.len(), args.input.display());

    let extraction = MessageExtractor::new()?.extract(&records);
    println!("{extraction}");

    let entries = if args.dedup {
        let deduped = deduplicate(extraction.entries);
        println!(
            "After deduplication: {} unique messages (removed {} duplicates)",
            deduped.kept.len(),
            deduped.removed
        );
        deduped.kept
    } else {
        extraction.entries
    };

    let valid = filter_valid(entries, config.max_delay.as_secs_f64());
    if valid.future > 0 {
        println!(
            "Filtered out {} messages scheduled for the future (negative delay)",
            valid.future
        );
    }
    if valid.too_large > 0 {
        println!(
            "Filtered out {} messages with delay above {} seconds",
            valid.too_large,
            config.max_delay.as_secs()
        );
    }
    let entries = valid.kept;

    println!();
    let Some(report) = DelayReport::from_entries(&entries) else {
        println!("No data to analyze.");
        println!("No data to plot.");
        return Ok(());
    };
    println!("{report}");

    let points = chart_points(&entries, config.display_offset);
    let Some(axis) = TimeAxis::spanning(
        points.iter().map(|(at, _)| *at),
        config.tick_interval,
        TICK_FORMAT,
    ) else {
        println!("No data to plot.");
        return Ok(());
    };

    let chart = TimelineChart {
        title: "Schedule reader delay (actual - scheduled)",
        x_label: "Scheduled time",
        y_label: "Delay (minutes)",
        axis,
        points: &points,
        connect_points: true,
        horizontal: Vec::new(),
        vertical: Vec::new(),
    };
    render_timeline(&chart, &args.output)?;
    println!();
    println!("Plot saved to: {}", args.output.display());
    info!(path = %args.output.display(), points = points.len(), "Rendered schedule delay chart");

    if args.show {
        open_in_viewer(&args.output);
    }
    Ok(())
}
