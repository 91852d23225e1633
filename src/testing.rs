//! Testing utilities for the preparation pipelines.
//!
//! This module bundles what the crate's own tests (and downstream users'
//! tests) need to exercise the pipelines without hand-building fixtures:
//!
//! - **Workspaces**: [`TestWorkspace`] is a temporary directory with helpers to
//!   write inputs and read outputs back.
//! - **Fixtures**: a small long-format eviction sample and its column map.
//! - **Row helpers**: [`rows_from_csv`] parses CSV text into [`RawRecord`]s.
//! - **Assertions**: ordering and tolerance checks with readable messages.
//! - **Progress capture**: [`RecordingProgress`] remembers every observation.
//!
//! # Quick Start
//!
//! ```
//! use evictprep::testing::*;
//! use evictprep::{Flavor, ShapeConfig, run_shape};
//!
//! # fn main() -> anyhow::Result<()> {
//! let ws = TestWorkspace::new()?;
//! let input = ws.write("long.csv", SAMPLE_LONG_CSV)?;
//! let output = ws.path("wide.csv");
//!
//! let config = ShapeConfig::new(sample_column_map(), Flavor::Raw);
//! run_shape(&config, &input, Some(&output))?;
//! assert!(ws.read("wide.csv")?.starts_with("GEOID,"));
//! # Ok(())
//! # }
//! ```

use crate::config::ColumnMap;
use crate::io::csv::RowSource;
use crate::progress::{Phase, Progress};
use crate::record::RawRecord;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Long-format sample: three counties over two or three years, with the
/// columns of the raw eviction export.
pub const SAMPLE_LONG_CSV: &str = "\
GEOID,year,name,parent-location,population,eviction-filings,eviction-rate,low-flag
01003,2000,Baldwin County,Alabama,140415,151,0.07,0
01001,2000,Autauga County,Alabama,43671,61,0.18,0
01001,2010,Autauga County,Alabama,54571,199,0.97,0
01003,2010,Baldwin County,Alabama,182265,412,0.41,0
01001,2016,Autauga County,Alabama,55416,301,1.52,0
01005,2010,Barbour County,Alabama,27457,20,0.11,1
";

/// Column map matching [`SAMPLE_LONG_CSV`]; `low-flag` is left unmapped.
#[must_use]
pub fn sample_column_map() -> ColumnMap {
    ColumnMap::from_pairs([
        ("name", "name"),
        ("parent-location", "parent_location"),
        ("population", "p"),
        ("eviction-filings", "ef"),
        ("eviction-rate", "er"),
    ])
}

/// Parse CSV text (with header) into rows.
///
/// # Panics
/// Panics if the text is not valid CSV.
#[must_use]
pub fn rows_from_csv(text: &str) -> Vec<RawRecord> {
    RowSource::from_reader(text.as_bytes())
        .expect("read CSV header")
        .collect::<Result<Vec<_>, _>>()
        .expect("read CSV rows")
}

/// A temporary directory that is deleted when dropped.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace (the file need not exist).
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name` and return its path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.path(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// # Errors
    /// Returns an error if the file cannot be read as UTF-8.
    pub fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.path(name))
    }
}

/// Assert that `items` is strictly ascending.
///
/// # Panics
/// Panics at the first pair that is out of order or equal.
pub fn assert_strictly_ascending<T: Ord + Debug>(items: &[T]) {
    for (i, pair) in items.windows(2).enumerate() {
        assert!(
            pair[0] < pair[1],
            "not strictly ascending at index {i}: {:?} !< {:?}\n  Full: {items:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Assert that `actual` is within `tolerance` of `expected`.
///
/// # Panics
/// Panics when the difference exceeds `tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "value mismatch:\n  Expected: {expected} (±{tolerance})\n  Actual: {actual}"
    );
}

/// Progress reporter that records every observation.
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    pub observed: Vec<(Phase, u64)>,
}

impl RecordingProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations of one phase, in order.
    #[must_use]
    pub fn counts(&self, phase: Phase) -> Vec<u64> {
        self.observed
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, n)| *n)
            .collect()
    }
}

impl Progress for RecordingProgress {
    fn observe(&mut self, phase: Phase, rows: u64) {
        self.observed.push((phase, rows));
    }
}
