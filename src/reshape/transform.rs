//! Per-row column renaming and period suffixing.

use crate::config::{ColumnMap, ShapeConfig};
use crate::error::{PrepError, PrepResult};
use crate::record::RawRecord;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Number of trailing period characters used as the column suffix.
pub const SUFFIX_LEN: usize = 2;

/// Renamed columns of one input row, in header order.
pub type NarrowRecord = IndexMap<String, String>;

/// Last [`SUFFIX_LEN`] characters of `period` (`"2010"` → `"10"`).
///
/// ```
/// use evictprep::reshape::period_suffix;
///
/// assert_eq!(period_suffix("2016"), Some("16"));
/// assert_eq!(period_suffix("7"), None);
/// ```
#[must_use]
pub fn period_suffix(period: &str) -> Option<&str> {
    let n = period.chars().count();
    if n < SUFFIX_LEN {
        return None;
    }
    let (start, _) = period.char_indices().nth(n - SUFFIX_LEN)?;
    Some(&period[start..])
}

/// Maps raw columns to output columns for one row.
#[derive(Debug, Clone)]
pub struct RowTransformer {
    column_map: ColumnMap,
    time_invariant: HashSet<String>,
    period_column: String,
}

impl RowTransformer {
    pub fn new<I, S>(column_map: ColumnMap, time_invariant: I, period_column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_map,
            time_invariant: time_invariant.into_iter().map(Into::into).collect(),
            period_column: period_column.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ShapeConfig) -> Self {
        Self {
            column_map: config.column_map.clone(),
            time_invariant: config.time_invariant.clone(),
            period_column: config.period_column.clone(),
        }
    }

    /// Rename the mapped columns of `raw`; time-varying ones get `-YY`.
    ///
    /// The period is only consulted when the row has a time-varying column.
    ///
    /// # Errors
    /// [`PrepError::MalformedRow`] when a suffix is needed and the period field
    /// is missing or shorter than two characters.
    pub fn transform(&self, raw: &RawRecord) -> PrepResult<NarrowRecord> {
        let mut out = NarrowRecord::new();
        let mut suffix: Option<&str> = None;
        for (column, value) in raw.iter() {
            let Some(mapped) = self.column_map.get(column) else {
                continue;
            };
            if self.time_invariant.contains(mapped) {
                out.insert(mapped.to_string(), value.to_string());
                continue;
            }
            let sfx = match suffix {
                Some(s) => s,
                None => *suffix.insert(self.suffix_of(raw)?),
            };
            out.insert(format!("{mapped}-{sfx}"), value.to_string());
        }
        Ok(out)
    }

    /// Period suffix of `raw`.
    ///
    /// # Errors
    /// [`PrepError::MalformedRow`] when the period is missing or too short.
    pub fn suffix_of<'r>(&self, raw: &'r RawRecord) -> PrepResult<&'r str> {
        let period = raw
            .get(&self.period_column)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                PrepError::malformed(
                    raw.line(),
                    format!("missing period column `{}`", self.period_column),
                )
            })?;
        period_suffix(period).ok_or_else(|| {
            PrepError::malformed(
                raw.line(),
                format!("period `{period}` is shorter than {SUFFIX_LEN} characters"),
            )
        })
    }

    #[must_use]
    pub fn column_map(&self) -> &ColumnMap {
        &self.column_map
    }
}
