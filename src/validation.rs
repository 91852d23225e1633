//! Handling of malformed input rows.
//!
//! A row without an identifier or a usable period cannot be placed in the wide
//! output. [`RowPolicy`] decides what happens to it and [`ErrorCollector`]
//! keeps a record of every row that was left out so the run can report it.
//!
//! ```
//! use evictprep::validation::{ErrorCollector, RowPolicy, handle_malformed};
//! use evictprep::PrepError;
//!
//! let mut skipped = ErrorCollector::new();
//! let err = PrepError::malformed(7, "missing period column `year`");
//! handle_malformed(RowPolicy::Skip, err, Some("001"), &mut skipped).unwrap();
//! assert_eq!(skipped.error_count(), 1);
//! ```

use crate::error::{PrepError, PrepResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// What to do with a malformed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RowPolicy {
    /// Leave the row out without logging
    Skip,
    /// Leave the row out and log a warning
    #[default]
    Warn,
    /// Abort the run on the first malformed row
    Fail,
}

/// A row that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Source line number
    pub line: u64,
    /// Row identifier, when the row had one
    pub identifier: Option<String>,
    pub reason: String,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(ref id) = self.identifier {
            write!(f, " ({id})")?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Skipped rows kept for reporting; later ones are only counted.
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Counts skipped rows and keeps the first few for end-of-run reporting.
///
/// Memory stays bounded by the sample limit however many rows are skipped.
#[derive(Debug, Clone)]
pub struct ErrorCollector {
    count: usize,
    sample: Vec<SkippedRow>,
    limit: usize,
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::with_sample_limit(DEFAULT_SAMPLE_LIMIT)
    }
}

impl ErrorCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_sample_limit(limit: usize) -> Self {
        Self {
            count: 0,
            sample: Vec::new(),
            limit,
        }
    }

    pub fn add(&mut self, row: SkippedRow) {
        self.count += 1;
        if self.sample.len() < self.limit {
            self.sample.push(row);
        }
    }

    /// Total rows skipped, including those not kept in the sample.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The first skipped rows, in input order.
    #[must_use]
    pub fn rows(&self) -> &[SkippedRow] {
        &self.sample
    }

    /// Log one warning summarizing the skipped rows, listing the sample.
    pub fn log_summary(&self) {
        if self.count == 0 {
            return;
        }
        let sample: Vec<String> = self.sample.iter().map(ToString::to_string).collect();
        warn!(
            skipped = self.count,
            "malformed rows left out of the output; first: {}",
            sample.join("; ")
        );
    }
}

/// Apply `policy` to a row-level error.
///
/// Returns `Ok(())` when the row should be skipped and the run continue.
///
/// # Errors
/// Returns `err` unchanged under [`RowPolicy::Fail`], or when `err` is not a
/// row-level error at all.
pub fn handle_malformed(
    policy: RowPolicy,
    err: PrepError,
    identifier: Option<&str>,
    collector: &mut ErrorCollector,
) -> PrepResult<()> {
    let PrepError::MalformedRow { line, reason } = err else {
        return Err(err);
    };
    if policy == RowPolicy::Fail {
        return Err(PrepError::MalformedRow { line, reason });
    }
    let row = SkippedRow {
        line,
        identifier: identifier.map(str::to_string),
        reason,
    };
    if policy == RowPolicy::Warn {
        warn!("skipping {row}");
    }
    collector.add(row);
    Ok(())
}
