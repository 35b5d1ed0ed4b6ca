use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use delaylens::config::FetchConfig;
use delaylens::fetch::{FetchSummary, LogFetcher, SearchBackend, SearchPage, WindowError};
use delaylens::source::{load_records, save_records};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Records each query and answers according to the window's start time.
struct ScriptedBackend {
    queries: Mutex<Vec<Value>>,
    respond: Box<dyn Fn(&str, u64) -> Result<SearchPage, WindowError> + Send + Sync>,
}

impl ScriptedBackend {
    fn new(
        respond: impl Fn(&str, u64) -> Result<SearchPage, WindowError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    fn request_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, query: &Value) -> Result<SearchPage, WindowError> {
        self.queries.lock().unwrap().push(query.clone());
        let body = &query["params"]["body"];
        let gte = body["query"]["bool"]["filter"][0]["range"]["@timestamp"]["gte"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let from = body["from"].as_u64().unwrap_or(0);
        (self.respond)(&gte, from)
    }
}

fn t(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 15, hour, minute, 0).unwrap()
}

fn config(start: DateTime<Utc>, end: DateTime<Utc>) -> FetchConfig {
    FetchConfig {
        start,
        end,
        sample_interval: Duration::from_secs(600),
        sample_duration: Duration::from_secs(30),
        ..Default::default()
    }
}

fn nested_hit(n: u64, level: &str) -> Value {
    json!({
        "_source": {
            "@timestamp": format!("2025-12-15T17:30:{:02}.000Z", n % 60),
            "ct_deployment": "prod",
            "json": {
                "asctime": "2025-12-15 17:30:00,000",
                "message": format!("Got message b'{n}' with schedule_timestamp 1765819800.0"),
                "levelname": level,
                "service_name": "schedule_pubsub_reader"
            }
        }
    })
}

fn page(total: u64, hits: Vec<Value>) -> SearchPage {
    SearchPage { total, hits }
}

#[tokio::test]
async fn test_windows_cover_range_without_passing_end() {
    let fetcher = LogFetcher::new(
        ScriptedBackend::new(|_, _| Ok(page(0, vec![]))),
        config(t(17, 30), t(17, 55)),
    );

    let run = fetcher.fetch_all().await;
    assert_eq!(run.windows, 3);
    assert_eq!(fetcher.backend().request_count(), 3);
    assert!(run.records.is_empty());
    assert_eq!(run.failed_windows, 0);
}

#[tokio::test]
async fn test_offset_ceiling_stops_after_two_requests() {
    let fetcher = LogFetcher::new(
        ScriptedBackend::new(|_, from| {
            let hits = (from..from + 5000).map(|n| nested_hit(n, "INFO")).collect();
            Ok(page(12_000, hits))
        }),
        config(t(17, 30), t(17, 31)),
    );

    let run = fetcher.fetch_all().await;
    assert_eq!(run.windows, 1);
    assert_eq!(run.requests, 2);
    assert_eq!(fetcher.backend().request_count(), 2);
    assert_eq!(run.records.len(), 10_000);

    let offsets: Vec<u64> = fetcher
        .backend()
        .queries
        .lock()
        .unwrap()
        .iter()
        .map(|q| q["params"]["body"]["from"].as_u64().unwrap())
        .collect();
    assert_eq!(offsets, vec![0, 5000]);
}

#[tokio::test]
async fn test_failed_window_does_not_stop_the_run() {
    let fetcher = LogFetcher::new(
        ScriptedBackend::new(|gte, _| {
            if gte == "2025-12-15T17:40:00Z" {
                Err(WindowError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            } else {
                Ok(page(2, vec![nested_hit(1, "INFO"), nested_hit(2, "WARNING")]))
            }
        }),
        config(t(17, 30), t(17, 55)),
    );

    let run = fetcher.fetch_all().await;
    assert_eq!(run.windows, 3);
    assert_eq!(run.failed_windows, 1);
    assert_eq!(run.records.len(), 4);
}

#[tokio::test]
async fn test_records_before_failure_are_kept() {
    let fetcher = LogFetcher::new(
        ScriptedBackend::new(|_, from| {
            if from == 0 {
                let hits = (0..5000).map(|n| nested_hit(n, "INFO")).collect();
                Ok(page(9000, hits))
            } else {
                Err(WindowError::Malformed("truncated body".to_string()))
            }
        }),
        config(t(17, 30), t(17, 31)),
    );

    let window = fetcher.windows()[0];
    let fetched = fetcher.fetch_window(&window).await;
    assert_eq!(fetched.requests, 2);
    assert_eq!(fetched.records.len(), 5000);
    assert!(matches!(fetched.error, Some(WindowError::Malformed(_))));
}

#[tokio::test]
async fn test_fetched_logs_save_and_summarize() {
    let fetcher = LogFetcher::new(
        ScriptedBackend::new(|_, _| {
            Ok(page(
                3,
                vec![
                    nested_hit(5, "INFO"),
                    nested_hit(3, "WARNING"),
                    json!({ "_source": { "json.levelname": "INFO", "json.message": "flat" } }),
                ],
            ))
        }),
        config(t(17, 30), t(17, 31)),
    );

    let run = fetcher.fetch_all().await;
    assert_eq!(run.records.len(), 3);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schedule_reader_logs.json");
    save_records(&path, &run.records).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {"));
    assert!(text.contains("\"deployment\": null"));
    assert_eq!(load_records(&path).unwrap(), run.records);

    let summary = FetchSummary::from_records(&run.records).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.by_level[0], ("INFO".to_string(), 2));
    assert_eq!(summary.by_deployment[0], ("prod".to_string(), 2));
    assert_eq!(summary.by_deployment[1], ("UNKNOWN".to_string(), 1));
    assert_eq!(summary.first_timestamp.as_deref(), Some("2025-12-15T17:30:03.000Z"));
    assert_eq!(summary.last_timestamp.as_deref(), Some("2025-12-15T17:30:05.000Z"));
}
