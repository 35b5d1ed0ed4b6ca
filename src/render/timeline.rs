use super::{
    draw_error, epoch_seconds, format_epoch_seconds, padded_range, KeyPointAxis, RenderError,
};
use chrono::{DateTime, NaiveDateTime};
use plotters::prelude::*;
use std::path::Path;
use std::time::Duration;

const SIZE: (u32, u32) = (1400, 800);

/// A wall-clock x axis clamped to `[start, end]` with ticks on multiples of
/// `tick_interval` (so a 2h interval lands on even hours).
#[derive(Debug, Clone)]
pub struct TimeAxis {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub tick_interval: Duration,
    pub label_format: String,
}

impl TimeAxis {
    /// Axis spanning the given instants exactly.
    pub fn spanning(
        instants: impl Iterator<Item = NaiveDateTime>,
        tick_interval: Duration,
        label_format: &str,
    ) -> Option<Self> {
        let (start, end) = instants.fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, t| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
                None => (t, t),
            })
        })?;

        Some(Self {
            start,
            end,
            tick_interval,
            label_format: label_format.to_string(),
        })
    }

    pub fn ticks(&self) -> Vec<NaiveDateTime> {
        let step = self.tick_interval.as_secs() as i64;
        if step <= 0 {
            return Vec::new();
        }

        let start = self.start.and_utc().timestamp();
        let end = self.end.and_utc().timestamp();
        let first = if start.rem_euclid(step) == 0 {
            start
        } else {
            (start.div_euclid(step) + 1) * step
        };
        if first > end {
            return Vec::new();
        }

        (first..=end)
            .step_by(step as usize)
            .filter_map(|s| DateTime::from_timestamp(s, 0).map(|dt| dt.naive_utc()))
            .collect()
    }
}

/// A labeled horizontal or vertical marker line.
#[derive(Debug, Clone)]
pub struct ReferenceLine<T> {
    pub at: T,
    pub label: String,
    pub color: RGBColor,
}

#[derive(Debug, Clone)]
pub struct TimelineChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub axis: TimeAxis,
    pub points: &'a [(NaiveDateTime, f64)],
    /// Draw a line through the points in the order given.
    pub connect_points: bool,
    pub horizontal: Vec<ReferenceLine<f64>>,
    pub vertical: Vec<ReferenceLine<NaiveDateTime>>,
}

/// Render a scatter of values over wall-clock time to an SVG file.
///
/// A chart with reference lines but no points still renders its axes and lines.
pub fn render_timeline(chart: &TimelineChart<'_>, path: &Path) -> Result<(), RenderError> {
    if chart.points.is_empty() && chart.horizontal.is_empty() && chart.vertical.is_empty() {
        return Err(RenderError::Empty);
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_error(path, e))?;

    let x_start = epoch_seconds(chart.axis.start);
    let x_end = epoch_seconds(chart.axis.end).max(x_start + 1.0);
    let (y_low, y_high) = padded_range(
        chart
            .points
            .iter()
            .map(|(_, y)| *y)
            .chain(chart.horizontal.iter().map(|line| line.at)),
    );
    let ticks: Vec<f64> = chart.axis.ticks().into_iter().map(epoch_seconds).collect();
    let tick_count = ticks.len().max(2);

    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(150)
        .y_label_area_size(90)
        .build_cartesian_2d(KeyPointAxis::new(x_start..x_end, ticks), y_low..y_high)
        .map_err(|e| draw_error(path, e))?;

    let label_format = chart.axis.label_format.clone();
    let x_formatter = move |x: &f64| format_epoch_seconds(*x, &label_format);

    ctx.configure_mesh()
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .x_labels(tick_count)
        .x_label_formatter(&x_formatter)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()
        .map_err(|e| draw_error(path, e))?;

    let points: Vec<(f64, f64)> = chart
        .points
        .iter()
        .map(|(t, y)| (epoch_seconds(*t), *y))
        .collect();

    ctx.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.5).filled())),
    )
    .map_err(|e| draw_error(path, e))?;

    if chart.connect_points {
        ctx.draw_series(LineSeries::new(
            points.iter().copied(),
            RED.mix(0.7).stroke_width(1),
        ))
        .map_err(|e| draw_error(path, e))?;
    }

    for line in &chart.horizontal {
        let color = line.color;
        ctx.draw_series(LineSeries::new(
            vec![(x_start, line.at), (x_end, line.at)],
            color.mix(0.5).stroke_width(1),
        ))
        .map_err(|e| draw_error(path, e))?
        .label(line.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    for line in &chart.vertical {
        let color = line.color;
        let x = epoch_seconds(line.at);
        ctx.draw_series(LineSeries::new(
            vec![(x, y_low), (x, y_high)],
            color.mix(0.7).stroke_width(2),
        ))
        .map_err(|e| draw_error(path, e))?
        .label(line.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if !chart.horizontal.is_empty() || !chart.vertical.is_empty() {
        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| draw_error(path, e))?;
    }

    root.present().map_err(|e| draw_error(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn axis(start: &str, end: &str) -> TimeAxis {
        TimeAxis {
            start: at(start),
            end: at(end),
            tick_interval: Duration::from_secs(2 * 3600),
            label_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }

    #[test]
    fn test_ticks_land_on_even_hours() {
        let ticks = axis("2025-12-15 16:30", "2025-12-15 23:00").ticks();
        assert_eq!(
            ticks,
            vec![
                at("2025-12-15 18:00"),
                at("2025-12-15 20:00"),
                at("2025-12-15 22:00")
            ]
        );
    }

    #[test]
    fn test_ticks_include_aligned_bounds() {
        let ticks = axis("2025-12-15 16:00", "2025-12-17 00:00").ticks();
        assert_eq!(ticks.len(), 17);
        assert_eq!(ticks.first(), Some(&at("2025-12-15 16:00")));
        assert_eq!(ticks.last(), Some(&at("2025-12-17 00:00")));
    }

    #[test]
    fn test_spanning_axis() {
        let axis = TimeAxis::spanning(
            [at("2025-12-15 20:00"), at("2025-12-15 18:00")].into_iter(),
            Duration::from_secs(3600),
            "%H:%M",
        )
        .unwrap();
        assert_eq!(axis.start, at("2025-12-15 18:00"));
        assert_eq!(axis.end, at("2025-12-15 20:00"));
        assert!(TimeAxis::spanning(std::iter::empty(), Duration::from_secs(60), "%H").is_none());
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.svg");
        let points = vec![(at("2025-12-15 17:00"), 3.0), (at("2025-12-15 19:00"), -1.5)];

        let chart = TimelineChart {
            title: "Delay",
            x_label: "Time",
            y_label: "Minutes",
            axis: axis("2025-12-15 16:00", "2025-12-15 20:00"),
            points: &points,
            connect_points: true,
            horizontal: vec![ReferenceLine {
                at: 0.0,
                label: "Zero difference".to_string(),
                color: RED,
            }],
            vertical: vec![ReferenceLine {
                at: at("2025-12-15 18:30"),
                label: "2025-12-15 18:30".to_string(),
                color: BLUE,
            }],
        };

        render_timeline(&chart, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("2025-12-15 16:00"));
        assert!(svg.contains("2025-12-15 18:00"));
        assert!(svg.contains("2025-12-15 20:00"));
        assert!(!svg.contains("2025-12-15 17:00"));
    }

    #[test]
    fn test_render_rejects_empty_series() {
        let dir = TempDir::new().unwrap();
        let chart = TimelineChart {
            title: "Delay",
            x_label: "Time",
            y_label: "Minutes",
            axis: axis("2025-12-15 16:00", "2025-12-15 20:00"),
            points: &[],
            connect_points: false,
            horizontal: Vec::new(),
            vertical: Vec::new(),
        };
        let result = render_timeline(&chart, &dir.path().join("empty.svg"));
        assert!(matches!(result, Err(RenderError::Empty)));
    }

    #[test]
    fn test_render_reference_lines_without_points() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lines.svg");
        let chart = TimelineChart {
            title: "Delay",
            x_label: "Time",
            y_label: "Minutes",
            axis: axis("2025-12-15 16:00", "2025-12-15 20:00"),
            points: &[],
            connect_points: false,
            horizontal: vec![ReferenceLine {
                at: 0.0,
                label: "Zero difference".to_string(),
                color: RED,
            }],
            vertical: Vec::new(),
        };

        render_timeline(&chart, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Zero difference"));
        assert!(svg.contains("2025-12-15 18:00"));
    }
}
