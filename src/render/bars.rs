use super::{draw_error, KeyPointAxis, RenderError};
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1400, 600);
const BAR_COLOR: RGBColor = RGBColor(0x4A, 0x90, 0xD9);
const MAX_DATE_LABELS: usize = 30;

#[derive(Debug, Clone)]
pub struct DailyBarChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Per-day counts, ascending by day. Days absent from the slice are gaps.
    pub bars: &'a [(NaiveDate, usize)],
}

/// Day offsets that get a date label, spaced so at most `MAX_DATE_LABELS` appear.
fn label_days(span_days: i64) -> Vec<f64> {
    let step = (span_days as usize + 1).div_ceil(MAX_DATE_LABELS).max(1);
    (0..=span_days.max(0) as usize)
        .step_by(step)
        .map(|d| d as f64)
        .collect()
}

/// Render per-day counts as a bar chart to an SVG file.
pub fn render_daily_bars(chart: &DailyBarChart<'_>, path: &Path) -> Result<(), RenderError> {
    let (Some((first_day, _)), Some((last_day, _))) = (chart.bars.first(), chart.bars.last())
    else {
        return Err(RenderError::Empty);
    };
    let first_day = *first_day;
    let span_days = (*last_day - first_day).num_days();
    let peak = chart.bars.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64;

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_error(path, e))?;

    let labels = label_days(span_days);
    let label_count = labels.len().max(2);

    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(110)
        .y_label_area_size(70)
        .build_cartesian_2d(
            KeyPointAxis::new(-0.5..span_days as f64 + 0.5, labels),
            0.0..(peak * 1.05).max(1.0),
        )
        .map_err(|e| draw_error(path, e))?;

    let x_formatter = move |x: &f64| {
        (first_day + chrono::Duration::days(x.round() as i64))
            .format("%Y-%m-%d")
            .to_string()
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .x_labels(label_count)
        .x_label_formatter(&x_formatter)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()
        .map_err(|e| draw_error(path, e))?;

    ctx.draw_series(chart.bars.iter().map(|(day, count)| {
        let x = (*day - first_day).num_days() as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *count as f64)], BAR_COLOR.filled())
    }))
    .map_err(|e| draw_error(path, e))?;

    root.present().map_err(|e| draw_error(path, e))?;
    Ok(())
}
