//! Per-column extents: min, max, 1st and 99th percentile.
//!
//! Rows are coerced to numbers field by field ([`coerce`]) and the whole
//! dataset is reduced column by column ([`reducer`]).

pub mod coerce;
pub mod reducer;

pub use coerce::{Coerced, NumericRecord, coerce_numeric, coerce_numeric_with_drops, parse_numeric};
pub use reducer::{EXTENT_HEADER, ExtentRecord, extent_columns, format_number, reduce_extents};
