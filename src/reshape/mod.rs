//! Long → wide reshaping.
//!
//! Long input has one row per (region, year). Wide output has one row per
//! region, with every time-varying column repeated once per year under a
//! `name-YY` key and time-invariant columns copied through once.
//!
//! - [`transform`] renames and suffixes the columns of a single row.
//! - [`aggregator`] merges rows by identifier and writes the sorted result.

pub mod aggregator;
pub mod transform;

pub use aggregator::{AccumulatedRecord, Aggregator, Ingested, WideTable, column_order};
pub use transform::{NarrowRecord, RowTransformer, period_suffix};
