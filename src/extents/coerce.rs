//! Numeric coercion of raw rows.
//!
//! A field survives only if its trimmed text parses to a finite number. Every
//! other field is dropped from the row rather than stored as a placeholder, so
//! rows downstream may carry different key sets.

use crate::record::RawRecord;
use indexmap::IndexMap;

/// Column → numeric value, in header order.
pub type NumericRecord = IndexMap<String, f64>;

/// Parse one field as a number.
///
/// Leading and trailing whitespace is ignored. Empty, non-numeric, NaN and
/// infinite values yield `None`.
///
/// ```
/// use evictprep::extents::parse_numeric;
///
/// assert_eq!(parse_numeric(" 12.5 "), Some(12.5));
/// assert_eq!(parse_numeric("1e3"), Some(1000.0));
/// assert_eq!(parse_numeric(""), None);
/// assert_eq!(parse_numeric("Autauga County"), None);
/// assert_eq!(parse_numeric("NaN"), None);
/// ```
#[must_use]
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A coerced row together with the columns that did not survive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coerced {
    pub values: NumericRecord,
    pub dropped: Vec<String>,
}

/// Keep only the numeric fields of `raw`.
#[must_use]
pub fn coerce_numeric(raw: &RawRecord) -> NumericRecord {
    coerce_numeric_with_drops(raw).values
}

/// Like [`coerce_numeric`], also reporting which columns were dropped.
#[must_use]
pub fn coerce_numeric_with_drops(raw: &RawRecord) -> Coerced {
    let mut out = Coerced::default();
    for (column, value) in raw.iter() {
        match parse_numeric(value) {
            Some(v) => {
                out.values.insert(column.to_string(), v);
            }
            None => out.dropped.push(column.to_string()),
        }
    }
    out
}
