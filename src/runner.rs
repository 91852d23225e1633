//! Pipeline runners: source → transformer → aggregator → sink.
//!
//! [`run_shape`] drives the long → wide reshape, [`run_extents`] the extent
//! extraction. Both read a CSV file (optionally compressed), write CSV to a
//! file or stdout, and return a [`RunMetrics`] summary.

use crate::config::{ExtentsConfig, ShapeConfig};
use crate::error::PrepResult;
use crate::extents::{coerce_numeric, reduce_extents};
use crate::io::compression::FinishWrite;
use crate::io::csv::{close_output, create_output, csv_writer, open_rows, write_csv_vec};
use crate::metrics::RunMetrics;
use crate::progress::{IntervalProgress, NoProgress, Progress};
use crate::reshape::Aggregator;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// How the extents reduction is executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecMode {
    /// One pass over the rows on the calling thread.
    #[default]
    Sequential,
    /// Rows split into partitions reduced on the rayon pool, then merged in
    /// partition order. `None` uses one partition per pool thread.
    Parallel { partitions: Option<usize> },
}

/// Reshape `input` from long to wide and write it to `output` (stdout if `None`).
///
/// Progress is reported only when writing to a file.
///
/// # Errors
/// Input, configuration and I/O errors, malformed rows under
/// [`RowPolicy::Fail`](crate::RowPolicy::Fail), and
/// [`PrepError::EmptyDataset`](crate::PrepError::EmptyDataset) when no row
/// could be aggregated.
pub fn run_shape(
    config: &ShapeConfig,
    input: impl AsRef<Path>,
    output: Option<&Path>,
) -> PrepResult<RunMetrics> {
    let progress: Box<dyn Progress> = match output {
        Some(_) => Box::new(IntervalProgress::new(config.progress_interval)),
        None => Box::new(NoProgress),
    };
    run_shape_with_progress(config, input, output, progress)
}

/// [`run_shape`] with a caller-supplied progress reporter.
///
/// # Errors
/// See [`run_shape`].
pub fn run_shape_with_progress<P: Progress>(
    config: &ShapeConfig,
    input: impl AsRef<Path>,
    output: Option<&Path>,
    progress: P,
) -> PrepResult<RunMetrics> {
    let started = Instant::now();
    let input = input.as_ref();
    info!(input = %input.display(), id_column = %config.row_id_column, "reshaping");

    let rows = open_rows(input)?;
    let mut aggregator = Aggregator::with_progress(config, progress);
    aggregator.ingest_all(rows)?;
    let mut table = aggregator.finalize(config.schema)?;

    let mut writer = csv_writer(create_output(output)?);
    let written = table.write_csv(&mut writer)?;
    close_output(writer)?;

    let mut metrics = RunMetrics::new("shape-data");
    metrics.rows_read = table.rows_read();
    metrics.rows_skipped = table.skipped().error_count() as u64;
    metrics.identifiers = table.len() as u64;
    metrics.columns = table.columns().len() as u64;
    metrics.rows_written = written;
    metrics.set_elapsed(started.elapsed());
    Ok(metrics)
}

/// Compute column extents of `input` and write them to `output` (stdout if `None`).
///
/// All rows are held in memory until the reduction runs.
///
/// # Errors
/// Input and I/O errors, and
/// [`PrepError::EmptyDataset`](crate::PrepError::EmptyDataset) for an input
/// without data rows.
pub fn run_extents(
    config: &ExtentsConfig,
    input: impl AsRef<Path>,
    output: Option<&Path>,
) -> PrepResult<RunMetrics> {
    let started = Instant::now();
    let input = input.as_ref();
    info!(input = %input.display(), "extracting extents");

    let mut records = Vec::new();
    for row in open_rows(input)? {
        records.push(coerce_numeric(&row?));
    }
    let extents = reduce_extents(&records, config)?;
    let mut sink = create_output(output)?;
    let written = write_csv_vec(&mut sink, &extents)?;
    FinishWrite::finish(sink)?;

    let mut metrics = RunMetrics::new("extract-extents");
    metrics.rows_read = records.len() as u64;
    metrics.columns = extents.len() as u64;
    metrics.rows_written = written as u64;
    metrics.set_elapsed(started.elapsed());
    Ok(metrics)
}
