//! Chart rendering. Callers hand over already-computed series; nothing in
//! here knows about delays, companies or log records.

pub mod bars;
pub mod timeline;

pub use bars::{render_daily_bars, DailyBarChart};
pub use plotters::style::RGBColor;
pub use timeline::{render_timeline, ReferenceLine, TimeAxis, TimelineChart};

use chrono::{DateTime, NaiveDateTime};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to draw chart '{}': {message}", path.display())]
    Draw { path: PathBuf, message: String },

    #[error("nothing to plot")]
    Empty,
}

pub(crate) fn draw_error<E: std::fmt::Display>(path: &Path, e: E) -> RenderError {
    RenderError::Draw {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// An f64 axis whose mesh lines and labels sit on caller-chosen points
/// instead of the evenly spaced values plotters would pick.
#[derive(Debug, Clone)]
pub(crate) struct KeyPointAxis {
    range: Range<f64>,
    points: Vec<f64>,
}

impl KeyPointAxis {
    /// Points outside `range` are dropped.
    pub(crate) fn new(range: Range<f64>, points: Vec<f64>) -> Self {
        let points = points
            .into_iter()
            .filter(|p| *p >= range.start && *p <= range.end)
            .collect();
        Self { range, points }
    }
}

impl Ranged for KeyPointAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        RangedCoordf64::from(self.range.clone()).map(value, limit)
    }

    /// Every point when they fit, otherwise every n-th so spacing stays regular.
    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let max = hint.max_num_points();
        if max == 0 || self.points.is_empty() {
            return Vec::new();
        }
        let stride = self.points.len().div_ceil(max);
        self.points.iter().copied().step_by(stride).collect()
    }

    fn range(&self) -> Range<f64> {
        self.range.clone()
    }
}

/// Seconds since the Unix epoch, the x coordinate used for time axes.
pub(crate) fn epoch_seconds(instant: NaiveDateTime) -> f64 {
    instant.and_utc().timestamp_millis() as f64 / 1_000.0
}

pub(crate) fn format_epoch_seconds(seconds: f64, format: &str) -> String {
    DateTime::from_timestamp_millis((seconds * 1_000.0).round() as i64)
        .map(|dt| dt.naive_utc().format(format).to_string())
        .unwrap_or_default()
}

/// Value range padded by 5% on each side, never degenerate.
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Open a rendered chart in the platform's default viewer.
///
/// Launch failures are logged and otherwise ignored; the chart is already on disk.
pub fn open_in_viewer(path: &Path) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    match Command::new(opener).arg(path).spawn() {
        Ok(_) => info!(path = %path.display(), opener, "Opened chart viewer"),
        Err(e) => warn!(path = %path.display(), opener, error = %e, "Could not open chart viewer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 10.0].into_iter()), (-0.5, 10.5));
        assert_eq!(padded_range([3.0].into_iter()), (2.0, 4.0));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_key_point_axis_keeps_points_in_range() {
        let axis = KeyPointAxis::new(0.0..10.0, vec![-1.0, 0.0, 4.0, 10.0, 12.0]);
        assert_eq!(axis.key_points(10usize), vec![0.0, 4.0, 10.0]);
        assert_eq!(axis.range(), 0.0..10.0);
    }

    #[test]
    fn test_key_point_axis_thins_by_stride() {
        let axis = KeyPointAxis::new(0.0..100.0, (0..10).map(|i| i as f64 * 10.0).collect());
        assert_eq!(axis.key_points(5usize), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
        assert_eq!(axis.key_points(4usize), vec![0.0, 30.0, 60.0, 90.0]);
        assert!(axis.key_points(0usize).is_empty());
    }

    #[test]
    fn test_key_point_axis_maps_linearly() {
        let axis = KeyPointAxis::new(0.0..10.0, Vec::new());
        assert_eq!(axis.map(&0.0, (0, 100)), 0);
        assert_eq!(axis.map(&10.0, (0, 100)), 100);
        assert_eq!(axis.map(&5.0, (0, 100)), 50);
    }

    #[test]
    fn test_epoch_round_trip_formatting() {
        let instant = NaiveDateTime::parse_from_str("2025-12-15 18:00", "%Y-%m-%d %H:%M").unwrap();
        let x = epoch_seconds(instant);
        assert_eq!(format_epoch_seconds(x, "%Y-%m-%d %H:%M"), "2025-12-15 18:00");
        assert_eq!(format_epoch_seconds(x, "%m-%d %H:%M"), "12-15 18:00");
    }
}
