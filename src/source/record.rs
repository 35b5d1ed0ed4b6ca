use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log artifact '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One log line as fetched from the search backend.
///
/// Every field is optional: artifacts written by older fetches, or hits with
/// a partial `_source` projection, simply leave keys out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub asctime: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub deployment: Option<String>,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

/// Read a JSON array of log records.
pub fn load_records(path: &Path) -> Result<Vec<LogRecord>, RecordError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RecordError::NotFound(path.to_path_buf()),
        _ => RecordError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| RecordError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write records as a pretty-printed JSON array, replacing any existing file.
pub fn save_records(path: &Path, records: &[LogRecord]) -> Result<(), RecordError> {
    let io_err = |source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| RecordError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(io_err)
}
