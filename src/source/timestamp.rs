use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// Minute-resolution format used by CRM exports, e.g. `2025-12-15 19:40`.
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format used for search backend range filters.
pub const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const ASCTIME_FRACTION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Datetime layouts accepted for loosely formatted export columns, tried in order.
const FLEXIBLE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const FLEXIBLE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("failed to parse timestamp '{value}' with format '{format}': {source}")]
    ParseError {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("epoch value {0} is out of range")]
    OutOfRange(f64),

    #[error("'{0}' does not match any supported date format")]
    Unrecognized(String),
}

/// Parse a naive wall-clock value with an explicit strptime format.
pub fn parse_strptime(value: &str, format: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(value.trim(), format).map_err(|e| TimestampError::ParseError {
        value: value.to_string(),
        format: format.to_string(),
        source: e,
    })
}

/// Parse a Python logging `asctime` value such as `2025-12-15 19:30:00,594`.
///
/// The millisecond separator may be a comma or a period. Values without a
/// fractional part are accepted as well.
pub fn parse_asctime(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let normalized = value.trim().replace(',', ".");
    parse_strptime(&normalized, ASCTIME_FRACTION_FORMAT)
        .or_else(|_| parse_strptime(&normalized, ASCTIME_FORMAT))
}

/// Convert fractional epoch seconds to a naive UTC wall-clock instant,
/// rounded to the microsecond.
pub fn parse_epoch_seconds(value: f64) -> Result<NaiveDateTime, TimestampError> {
    if !value.is_finite() {
        return Err(TimestampError::OutOfRange(value));
    }

    let micros = (value * 1_000_000.0).round();
    if micros.abs() >= i64::MAX as f64 {
        return Err(TimestampError::OutOfRange(value));
    }
    let micros = micros as i64;

    let seconds = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;

    Utc.timestamp_opt(seconds, nanos)
        .single()
        .map(|dt| dt.naive_utc())
        .ok_or(TimestampError::OutOfRange(value))
}

/// Parse a creation date in any of the layouts CRM exports are known to use.
///
/// RFC 3339 values are converted to UTC; everything else is taken as a naive
/// wall-clock value. Date-only values resolve to midnight.
pub fn parse_flexible(value: &str) -> Result<NaiveDateTime, TimestampError> {
    parse_flexible_in(value, &Utc)
}

/// Like [`parse_flexible`], but RFC 3339 values become wall-clock time in `zone`.
pub fn parse_flexible_in<Tz: TimeZone>(
    value: &str,
    zone: &Tz,
) -> Result<NaiveDateTime, TimestampError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(zone).naive_local());
    }

    for format in FLEXIBLE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    for format in FLEXIBLE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(TimestampError::Unrecognized(value.to_string()))
}

/// Render an instant the way the search backend expects range bounds.
pub fn format_query_time(instant: &DateTime<Utc>) -> String {
    instant.format(QUERY_FORMAT).to_string()
}

/// Signed seconds from `from` to `to`, with sub-second precision.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Signed fractional minutes from `from` to `to`.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    seconds_between(from, to) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_minute_format() {
        let dt = parse_strptime("2025-12-15 19:40", MINUTE_FORMAT).unwrap();
        assert_eq!(dt, at("2025-12-15 19:40:00"));
    }

    #[test]
    fn test_minute_format_rejects_garbage() {
        let result = parse_strptime("not a date", MINUTE_FORMAT);
        assert!(matches!(result, Err(TimestampError::ParseError { .. })));
    }

    #[test]
    fn test_asctime_comma_millis() {
        let dt = parse_asctime("2025-12-15 19:30:00,594").unwrap();
        assert_eq!(dt, at("2025-12-15 19:30:00.594"));
        assert_eq!(dt.nanosecond(), 594_000_000);
    }

    #[test]
    fn test_asctime_period_micros() {
        let dt = parse_asctime("2025-12-15 19:30:00.123456").unwrap();
        assert_eq!(dt.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_asctime_without_fraction() {
        let dt = parse_asctime("2025-12-15 19:30:00").unwrap();
        assert_eq!(dt, at("2025-12-15 19:30:00"));
    }

    #[test]
    fn test_asctime_invalid() {
        assert!(parse_asctime("15/12/2025 19:30").is_err());
    }

    #[test]
    fn test_epoch_seconds_fractional() {
        let dt = parse_epoch_seconds(1765827000.25).unwrap();
        assert_eq!(dt, at("2025-12-15 19:30:00.25"));
    }

    #[test]
    fn test_epoch_seconds_rejects_nan() {
        assert!(matches!(
            parse_epoch_seconds(f64::NAN),
            Err(TimestampError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_flexible_formats() {
        let expected = at("2025-06-01 10:15:00");
        assert_eq!(parse_flexible("2025-06-01 10:15").unwrap(), expected);
        assert_eq!(parse_flexible("2025-06-01 10:15:00").unwrap(), expected);
        assert_eq!(parse_flexible("2025-06-01T10:15:00").unwrap(), expected);
        assert_eq!(parse_flexible("2025-06-01T10:15:00Z").unwrap(), expected);
        assert_eq!(parse_flexible("06/01/2025 10:15").unwrap(), expected);
        assert_eq!(
            parse_flexible("2025-06-01").unwrap(),
            at("2025-06-01 00:00:00")
        );
    }

    #[test]
    fn test_flexible_rfc3339_offset_converts_to_utc() {
        let dt = parse_flexible("2025-06-01T12:15:00+02:00").unwrap();
        assert_eq!(dt, at("2025-06-01 10:15:00"));
    }

    #[test]
    fn test_flexible_rfc3339_follows_requested_zone() {
        let zone = chrono::FixedOffset::east_opt(5 * 3600).unwrap();
        let dt = parse_flexible_in("2025-06-01T10:15:00Z", &zone).unwrap();
        assert_eq!(dt, at("2025-06-01 15:15:00"));
        assert_eq!(
            parse_flexible_in("2025-06-01 10:15", &zone).unwrap(),
            at("2025-06-01 10:15:00")
        );
    }

    #[test]
    fn test_flexible_unrecognized() {
        assert!(matches!(
            parse_flexible("yesterday"),
            Err(TimestampError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_minutes_between_exact() {
        let signup = parse_strptime("2025-12-15 19:40", MINUTE_FORMAT).unwrap();
        let created = parse_strptime("2025-12-15 19:55", MINUTE_FORMAT).unwrap();
        assert_eq!(minutes_between(signup, created), 15.0);
        assert_eq!(minutes_between(created, signup), -15.0);
    }

    #[test]
    fn test_format_query_time() {
        let instant = Utc.with_ymd_and_hms(2025, 12, 15, 17, 30, 0).unwrap();
        assert_eq!(format_query_time(&instant), "2025-12-15T17:30:00Z");
    }
}
