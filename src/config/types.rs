use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tool settings. Every section falls back to the incident defaults, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub signup_delay: SignupDelayConfig,
    pub schedule_delay: ScheduleDelayConfig,
    pub fetch: FetchConfig,
    pub companies: CompaniesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupDelayConfig {
    pub signup_column: String,
    pub create_column: String,
    pub timestamp_format: String,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub indicator_start: NaiveDateTime,
    pub indicator_end: NaiveDateTime,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for SignupDelayConfig {
    fn default() -> Self {
        Self {
            signup_column: "signupTimestamp".to_string(),
            create_column: "Create Date".to_string(),
            timestamp_format: crate::source::timestamp::MINUTE_FORMAT.to_string(),
            window_start: wall_clock(2025, 12, 15, 16, 0),
            window_end: wall_clock(2025, 12, 17, 0, 0),
            indicator_start: wall_clock(2025, 12, 15, 19, 40),
            indicator_end: wall_clock(2025, 12, 16, 20, 15),
            tick_interval: Duration::from_secs(2 * 3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDelayConfig {
    /// Delays above this are treated as bad data and dropped.
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Added to scheduled times on the chart's x axis only.
    #[serde(with = "humantime_serde")]
    pub display_offset: Duration,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
}

impl Default for ScheduleDelayConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_secs(7 * 24 * 3600),
            display_offset: Duration::from_secs(2 * 3600),
            tick_interval: Duration::from_secs(2 * 3600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub endpoint: String,
    pub index_pattern: String,
    pub service_name: String,
    pub message_phrase: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub page_size: usize,
    /// Deepest `from + size` the backend will serve.
    pub max_offset: usize,
    #[serde(with = "humantime_serde")]
    pub sample_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub sample_duration: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://app.prod.connecteam.com:9000/elastic/internal/search/es".to_string(),
            index_pattern: "matrix-logs*".to_string(),
            service_name: "schedule_pubsub_reader".to_string(),
            message_phrase: "Got message".to_string(),
            start: utc(2025, 12, 15, 17, 30),
            end: utc(2025, 12, 16, 18, 30),
            page_size: 5000,
            max_offset: 10_000,
            sample_interval: Duration::from_secs(10 * 60),
            sample_duration: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompaniesConfig {
    pub name_column: String,
    pub date_column: String,
    /// Compared against the trimmed, lower-cased name.
    pub excluded_names: Vec<String>,
    /// Matched anywhere in the lower-cased name.
    pub excluded_substring: String,
    #[serde(with = "humantime_serde")]
    pub lookback: Duration,
}

impl Default for CompaniesConfig {
    fn default() -> Self {
        Self {
            name_column: "Company name".to_string(),
            date_column: "Create Date".to_string(),
            excluded_names: vec!["company".to_string(), "test".to_string(), "0".to_string()],
            excluded_substring: "automation".to_string(),
            lookback: Duration::from_secs(200 * 24 * 3600),
        }
    }
}

fn wall_clock(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
fetch:
  page_size: 100
  sample_duration: 1m
companies:
  lookback: 30days
"#,
        )
        .unwrap();

        assert_eq!(config.fetch.page_size, 100);
        assert_eq!(config.fetch.sample_duration, Duration::from_secs(60));
        assert_eq!(config.fetch.max_offset, 10_000);
        assert_eq!(config.companies.lookback, Duration::from_secs(30 * 86_400));
        assert_eq!(config.signup_delay, SignupDelayConfig::default());
    }

    #[test]
    fn test_timestamps_in_yaml() {
        let config: Config = serde_yaml::from_str(
            r#"
signup_delay:
  window_start: 2026-01-01T08:00:00
fetch:
  start: 2026-01-01T00:00:00Z
"#,
        )
        .unwrap();

        assert_eq!(config.signup_delay.window_start, wall_clock(2026, 1, 1, 8, 0));
        assert_eq!(config.fetch.start, utc(2026, 1, 1, 0, 0));
    }

    #[test]
    fn test_default_constants() {
        let config = Config::default();
        assert_eq!(config.signup_delay.indicator_start.to_string(), "2025-12-15 19:40:00");
        assert_eq!(config.fetch.end.to_rfc3339(), "2025-12-16T18:30:00+00:00");
        assert_eq!(config.schedule_delay.max_delay.as_secs(), 604_800);
    }
}
