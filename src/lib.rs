//! # evictprep
//!
//! Batch preparation of tabular eviction / census data. Two independent
//! pipelines share one CSV plumbing layer:
//!
//! - **Reshape** (`shape-data`): long input with one row per region and year
//!   becomes wide output with one row per region. Time-varying columns are
//!   renamed through a [`ColumnMap`] and suffixed with the two-digit year
//!   (`eviction-rate` in 2016 → `er-16`); time-invariant columns such as
//!   `name` are copied through once.
//! - **Extents** (`extract-extents`): min, max, 1st and 99th percentile of
//!   every numeric column.
//!
//! ## Quick Start
//!
//! ```
//! use evictprep::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let config = ShapeConfig::new(ColumnMap::from_pairs([("ef", "ef")]), Flavor::Raw);
//! let mut agg = Aggregator::new(&config);
//!
//! agg.ingest(&RawRecord::from_pairs([("GEOID", "001"), ("year", "2000"), ("ef", "5")]))?;
//! agg.ingest(&RawRecord::from_pairs([("GEOID", "001"), ("year", "2010"), ("ef", "7")]))?;
//! agg.ingest(&RawRecord::from_pairs([("GEOID", "002"), ("year", "2000"), ("ef", "3")]))?;
//!
//! let table = agg.finalize(SchemaPolicy::Union)?;
//! assert_eq!(table.columns(), ["GEOID", "ef-00", "ef-10"]);
//! assert_eq!(table.emit_row("002"), Some(vec!["002", "3", ""]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline shape
//!
//! Both pipelines run Source → Transformer → Aggregator → Sink on a single
//! thread:
//! 1. [`io::csv::RowSource`] yields [`RawRecord`]s lazily (compressed inputs
//!    are decompressed transparently, see [`io::compression`])
//! 2. rows are normalized: [`reshape::RowTransformer`] or
//!    [`extents::coerce_numeric`]
//! 3. [`Aggregator`] merges rows by identifier; [`extents::reduce_extents`]
//!    folds whole columns with the [`combiners`]
//! 4. results are written as CSV to a file or stdout
//!
//! The [`runner`] module wires these steps together and returns
//! [`RunMetrics`].
//!
//! ## Errors
//!
//! Library calls return [`PrepError`]. Malformed rows (no identifier, no
//! usable year) follow a [`RowPolicy`]: skipped with a warning by default.
//!
//! ## Feature Flags
//!
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`,
//!   `compression-xz` - codecs for compressed input and output
//! - `parallel` - row-partitioned parallel extents reduction
//!
//! ## Module Overview
//!
//! - [`config`] - flavors, column maps and run settings
//! - [`reshape`] - row transformer and identifier-keyed aggregator
//! - [`extents`] - numeric coercion and extent reduction
//! - [`combiners`] - min, max and quantile reductions
//! - [`io`] - CSV sources/sinks and compression
//! - [`progress`] - injectable progress reporting
//! - [`validation`] - malformed-row policy and collection
//! - [`runner`] - end-to-end pipeline entry points

pub mod combiners;
pub mod config;
pub mod error;
pub mod extents;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod progress;
pub mod record;
pub mod reshape;
pub mod runner;
pub mod testing;
pub mod validation;

// General re-exports
pub use config::{
    ColumnMap, DEFAULT_EXCLUDED, DEFAULT_PERIOD_COLUMN, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_TIME_INVARIANT, ExtentsConfig, Flavor, IDENTIFIER_KEY, SchemaPolicy, ShapeConfig,
};
pub use error::{PrepError, PrepResult};
pub use extents::{ExtentRecord, NumericRecord, coerce_numeric, parse_numeric, reduce_extents};
pub use metrics::RunMetrics;
pub use progress::{IntervalProgress, NoProgress, Progress};
pub use record::{Header, RawRecord};
pub use reshape::{AccumulatedRecord, Aggregator, Ingested, RowTransformer, WideTable};
pub use runner::{ExecMode, run_extents, run_shape, run_shape_with_progress};
pub use validation::{ErrorCollector, RowPolicy};
