//! Subcommand handlers. Each one loads its input, runs the pipeline for its
//! tool and prints the report to stdout; diagnostics go through `tracing`.

pub mod companies;
pub mod config;
pub mod fetch_logs;
pub mod schedule_delay;
pub mod signup_delay;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::render::RenderError;
use crate::source::{RecordError, TableError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read CSV export: {0}")]
    Table(#[from] TableError),

    #[error("failed to read or write log records: {0}")]
    Records(#[from] RecordError),

    #[error("failed to render chart: {0}")]
    Render(#[from] RenderError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to serialize config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config file already exists at {} (remove it first or use --stdout)", .0.display())]
    ConfigExists(PathBuf),

    #[error("no config file found; use --config to specify a path")]
    NoConfig,

    #[error("io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// The input path when the failure was a missing input file.
    pub fn missing_path(&self) -> Option<&Path> {
        match self {
            CommandError::Table(TableError::NotFound(path))
            | CommandError::Records(RecordError::NotFound(path))
            | CommandError::Config(ConfigError::NotFound(path)) => Some(path),
            _ => None,
        }
    }
}

/// Print a titled section banner, the way every report opens.
pub(crate) fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}
