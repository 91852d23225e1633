//! Error taxonomy shared by both pipelines.
//!
//! Library entry points return [`PrepError`]; the binaries wrap it in
//! `anyhow` with context at the edge.

use std::path::PathBuf;

/// Result alias for library operations.
pub type PrepResult<T> = Result<T, PrepError>;

/// Errors raised while preparing data.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Column map or other run configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The input file could not be opened or read.
    #[error("cannot read input {path}: {source}")]
    InputAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row lacks its identifier or period field.
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// No rows were available to establish an output schema.
    #[error("empty dataset: no rows available to establish a schema")]
    EmptyDataset,

    /// CSV tokenizing or serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// Build a [`PrepError::MalformedRow`].
    pub fn malformed<S: Into<String>>(line: u64, reason: S) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// `true` for errors that only concern a single input row.
    #[must_use]
    pub const fn is_row_level(&self) -> bool {
        matches!(self, Self::MalformedRow { .. })
    }
}
