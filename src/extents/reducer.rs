//! Extent reduction over a fully buffered dataset.
//!
//! The column set comes from the first record (or the union of all records,
//! see [`SchemaPolicy`]) minus the excluded columns. A record that lacks a
//! column does not contribute to that column's extent; it is not a zero.

use crate::combiners::{CombineFn, Extent, ExtentAcc};
use crate::config::{ExtentsConfig, SchemaPolicy};
use crate::error::{PrepError, PrepResult};
use crate::extents::coerce::NumericRecord;
use crate::runner::ExecMode;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use tracing::debug;

/// Header of the extents CSV.
pub const EXTENT_HEADER: [&str; 5] = ["id", "min", "max", "q1", "q99"];

/// Extent of one column.
///
/// Numbers serialize through [`format_number`], so whole numbers print
/// without a fractional part (`5`, not `5.0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtentRecord {
    pub id: String,
    #[serde(serialize_with = "shortest")]
    pub min: f64,
    #[serde(serialize_with = "shortest")]
    pub max: f64,
    #[serde(serialize_with = "shortest")]
    pub q1: f64,
    #[serde(serialize_with = "shortest")]
    pub q99: f64,
}

fn shortest<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_number(*v))
}

/// Shortest round-trip text for `v`, in JavaScript `Number#toString` layout.
///
/// Magnitudes of at least `1e21` or below `1e-6` use exponent notation with
/// an explicit sign (`1e+21`, `1.5e-7`); everything else is positional.
///
/// ```
/// use evictprep::extents::format_number;
///
/// assert_eq!(format_number(5.0), "5");
/// assert_eq!(format_number(0.000001), "0.000001");
/// assert_eq!(format_number(1e-7), "1e-7");
/// assert_eq!(format_number(-2.5e21), "-2.5e+21");
/// ```
#[must_use]
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if !(1e-6..1e21).contains(&abs) && abs.is_finite() {
        let text = format!("{v:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    v.to_string()
}

/// Columns to reduce, in first-observed order.
///
/// # Errors
/// [`PrepError::EmptyDataset`] when `records` is empty.
pub fn extent_columns(
    records: &[NumericRecord],
    excluded: &HashSet<String>,
    schema: SchemaPolicy,
) -> PrepResult<Vec<String>> {
    let first = records.first().ok_or(PrepError::EmptyDataset)?;
    let mut columns: IndexSet<&str> = first.keys().map(String::as_str).collect();
    if schema == SchemaPolicy::Union {
        for record in &records[1..] {
            columns.extend(record.keys().map(String::as_str));
        }
    }
    Ok(columns
        .into_iter()
        .filter(|c| !excluded.contains(*c))
        .map(str::to_string)
        .collect())
}

/// Compute one [`ExtentRecord`] per column.
///
/// # Errors
/// [`PrepError::EmptyDataset`] when `records` is empty.
pub fn reduce_extents(
    records: &[NumericRecord],
    config: &ExtentsConfig,
) -> PrepResult<Vec<ExtentRecord>> {
    let columns = extent_columns(records, &config.excluded, config.schema)?;
    let accs = match config.mode {
        ExecMode::Sequential => accumulate(records, &columns),
        ExecMode::Parallel { partitions } => accumulate_parallel(records, &columns, partitions),
    };
    let extent = Extent::default();
    Ok(columns
        .into_iter()
        .zip(accs)
        .filter_map(|(id, acc)| {
            debug!(column = %id, values = acc.count(), "extracting values");
            let stats = extent.finish(acc)?;
            Some(ExtentRecord {
                id,
                min: stats.min,
                max: stats.max,
                q1: stats.q1,
                q99: stats.q99,
            })
        })
        .collect())
}

/// One accumulator per column, filled from `records` in order.
fn accumulate(records: &[NumericRecord], columns: &[String]) -> Vec<ExtentAcc> {
    let extent = Extent::default();
    let mut accs: Vec<ExtentAcc> = columns.iter().map(|_| extent.create()).collect();
    for record in records {
        for (acc, column) in accs.iter_mut().zip(columns) {
            if let Some(&v) = record.get(column) {
                extent.add_input(acc, v);
            }
        }
    }
    accs
}

/// Row-partitioned accumulation; partials are merged in partition order.
#[cfg(feature = "parallel")]
fn accumulate_parallel(
    records: &[NumericRecord],
    columns: &[String],
    partitions: Option<usize>,
) -> Vec<ExtentAcc> {
    use rayon::prelude::*;

    let parts = partitions
        .unwrap_or_else(rayon::current_num_threads)
        .clamp(1, records.len().max(1));
    let chunk = records.len().div_ceil(parts).max(1);
    let extent = Extent::default();
    let partials: Vec<Vec<ExtentAcc>> = records
        .par_chunks(chunk)
        .map(|part| accumulate(part, columns))
        .collect();
    partials
        .into_iter()
        .reduce(|mut acc, part| {
            for (a, b) in acc.iter_mut().zip(part) {
                extent.merge(a, b);
            }
            acc
        })
        .unwrap_or_else(|| accumulate(&[], columns))
}

#[cfg(not(feature = "parallel"))]
fn accumulate_parallel(
    records: &[NumericRecord],
    columns: &[String],
    _partitions: Option<usize>,
) -> Vec<ExtentAcc> {
    accumulate(records, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, f64)]) -> NumericRecord {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_missing_values_do_not_count_as_zero() {
        let rows = vec![rec(&[("x", 5.0)]), rec(&[]), rec(&[("x", 7.0)])];
        let out = reduce_extents(&rows, &ExtentsConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].min, 5.0);
        assert_eq!(out[0].max, 7.0);
    }

    #[test]
    fn test_columns_come_from_first_record_minus_excluded() {
        let rows = vec![
            rec(&[("GEOID", 1.0), ("a", 1.0), ("n", 3.0)]),
            rec(&[("b", 2.0)]),
        ];
        let cfg = ExtentsConfig::default();
        let cols = extent_columns(&rows, &cfg.excluded, SchemaPolicy::FirstRecord).unwrap();
        assert_eq!(cols, vec!["a"]);
        let cols = extent_columns(&rows, &cfg.excluded, SchemaPolicy::Union).unwrap();
        assert_eq!(cols, vec!["a", "b"]);
    }

    #[test]
    fn test_extreme_magnitudes_use_signed_exponents() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-1.25e-9), "-1.25e-9");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.11000000000000001), "0.11000000000000001");
    }

    #[test]
    fn test_serializes_whole_numbers_without_fraction() {
        let mut buf = Vec::new();
        let row = ExtentRecord {
            id: "x".into(),
            min: 1.0,
            max: 100.0,
            q1: 1.5,
            q99: 99.25,
        };
        crate::io::csv::write_csv_vec(&mut buf, &[row]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "id,min,max,q1,q99\nx,1,100,1.5,99.25\n");
    }
}
