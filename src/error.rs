use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or rewriting the data files.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The top-level JSON value is not the array/object the command expects.
    #[error("unexpected shape in {path}: expected {expected}")]
    Shape { path: PathBuf, expected: &'static str },

    #[error("invalid alias table: {0}")]
    AliasTable(String),

    /// Raised only under `GenrePolicy::Strict`.
    #[error("record {index}: {reason}")]
    Record { index: usize, reason: String },

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl NormalizeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn shape(path: impl Into<PathBuf>, expected: &'static str) -> Self {
        Self::Shape {
            path: path.into(),
            expected,
        }
    }

    pub fn record(index: usize, reason: impl Into<String>) -> Self {
        Self::Record {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
