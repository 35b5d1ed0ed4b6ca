//! Sampled log retrieval from the search backend.
//!
//! The range is cut into short windows; each window is paged through with
//! `from`/`size` until it runs dry or hits the backend's offset ceiling.
//! Requests go out strictly one at a time.

pub mod client;
pub mod normalize;
pub mod query;
pub mod summary;
pub mod window;

pub use client::{HttpSearchBackend, SearchBackend, SearchPage, WindowError};
pub use normalize::normalize_hit;
pub use query::build_query;
pub use summary::FetchSummary;
pub use window::{generate_windows, sampling_percent, TimeWindow};

use crate::config::FetchConfig;
use crate::source::{LogRecord, RecordError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Output(#[from] RecordError),
}

/// What one window produced. Records fetched before a failure are kept.
#[derive(Debug, Default)]
pub struct WindowFetch {
    pub records: Vec<LogRecord>,
    /// Total reported by the backend on the first page.
    pub total: u64,
    pub requests: usize,
    /// Results beyond the offset ceiling that were not retrieved.
    pub missed: u64,
    pub error: Option<WindowError>,
}

/// Records from every window, in window order.
#[derive(Debug, Default)]
pub struct FetchRun {
    pub records: Vec<LogRecord>,
    pub windows: usize,
    pub failed_windows: usize,
    pub requests: usize,
}

pub struct LogFetcher<B> {
    backend: B,
    config: FetchConfig,
}

impl<B: SearchBackend> LogFetcher<B> {
    pub fn new(backend: B, config: FetchConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn windows(&self) -> Vec<TimeWindow> {
        generate_windows(
            self.config.start,
            self.config.end,
            self.config.sample_interval,
            self.config.sample_duration,
        )
    }

    /// Page through one window.
    pub async fn fetch_window(&self, window: &TimeWindow) -> WindowFetch {
        let page_size = self.config.page_size;
        let max_offset = self.config.max_offset as u64;
        let mut out = WindowFetch::default();
        let mut offset = 0usize;

        loop {
            let query = build_query(&self.config, window, offset);
            out.requests += 1;

            let page = match self.backend.search(&query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(window = %window, offset, error = %e, "Abandoning window");
                    out.error = Some(e);
                    break;
                }
            };

            if out.requests == 1 {
                out.total = page.total;
                if page.total > 0 {
                    info!(total = page.total, "Total in window");
                }
            }

            if page.hits.is_empty() {
                break;
            }

            let received = page.hits.len();
            out.records.extend(page.hits.iter().map(normalize_hit));
            offset += received;

            if received < page_size {
                break;
            }

            let fetched = offset as u64;
            if fetched >= page.total || fetched >= max_offset {
                if fetched >= max_offset && page.total > max_offset {
                    out.missed = page.total.saturating_sub(fetched);
                    warn!(
                        window = %window,
                        missed = out.missed,
                        max_offset,
                        "Offset limit reached, results may be missed in this window"
                    );
                }
                break;
            }
        }

        out
    }

    /// Fetch every window in order. A failed window is logged and skipped.
    pub async fn fetch_all(&self) -> FetchRun {
        let windows = self.windows();
        let mut run = FetchRun {
            windows: windows.len(),
            ..Default::default()
        };

        for (i, window) in windows.iter().enumerate() {
            info!("[{}/{}] Window: {}", i + 1, windows.len(), window);

            let fetched = self.fetch_window(window).await;
            run.requests += fetched.requests;
            if fetched.error.is_some() {
                run.failed_windows += 1;
            }
            let count = fetched.records.len();
            run.records.extend(fetched.records);
            info!(
                fetched = count,
                total_so_far = run.records.len(),
                "Window done"
            );
        }

        run
    }
}
