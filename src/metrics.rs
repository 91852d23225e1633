//! End-of-run summary for both pipelines.
//!
//! A [`RunMetrics`] is returned by every runner entry point. It can be logged,
//! rendered as JSON, or saved next to the output for later inspection.

use crate::error::PrepResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Counters collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// `shape-data` or `extract-extents`
    pub pipeline: String,
    /// Data rows read from the input (header excluded)
    pub rows_read: u64,
    /// Malformed rows left out
    pub rows_skipped: u64,
    /// Distinct row identifiers (reshape only)
    pub identifiers: u64,
    /// Columns in the output schema
    pub columns: u64,
    /// Data rows written (header excluded)
    pub rows_written: u64,
    pub elapsed_ms: u64,
}

impl RunMetrics {
    #[must_use]
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            ..Self::default()
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Write the metrics as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> PrepResult<()> {
        let mut file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            pipeline = %self.pipeline,
            rows_read = self.rows_read,
            rows_skipped = self.rows_skipped,
            identifiers = self.identifiers,
            columns = self.columns,
            rows_written = self.rows_written,
            elapsed_ms = self.elapsed_ms,
            "run complete"
        );
    }
}
