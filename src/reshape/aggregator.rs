//! Identifier-keyed accumulation of narrow rows into wide records.
//!
//! The [`Aggregator`] owns the identifier → record mapping while the input is
//! drained. [`Aggregator::finalize`] freezes it into a [`WideTable`] with a
//! single column order, which then writes every record, sorted by identifier,
//! one row at a time.
//!
//! Memory is proportional to the number of distinct identifiers (times their
//! columns), not to the number of input rows.

use crate::config::{IDENTIFIER_KEY, SchemaPolicy, ShapeConfig};
use crate::error::{PrepError, PrepResult};
use crate::progress::{NoProgress, Phase, Progress};
use crate::record::RawRecord;
use crate::reshape::transform::{NarrowRecord, RowTransformer};
use crate::validation::{ErrorCollector, RowPolicy, handle_malformed};
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

/// Output column → value for one identifier, in insertion order.
pub type AccumulatedRecord = IndexMap<String, String>;

/// Outcome of [`Aggregator::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// First row seen for its identifier.
    Created,
    /// Merged into an existing record.
    Merged,
    /// Malformed and left out under the row policy.
    Skipped,
}

/// Accumulates long-format rows into one wide record per identifier.
pub struct Aggregator<P: Progress = NoProgress> {
    transformer: RowTransformer,
    row_id_column: String,
    policy: RowPolicy,
    records: BTreeMap<String, AccumulatedRecord>,
    skipped: ErrorCollector,
    rows_read: u64,
    progress: P,
}

impl Aggregator<NoProgress> {
    #[must_use]
    pub fn new(config: &ShapeConfig) -> Self {
        Self::with_progress(config, NoProgress)
    }
}

impl<P: Progress> Aggregator<P> {
    pub fn with_progress(config: &ShapeConfig, progress: P) -> Self {
        Self {
            transformer: RowTransformer::from_config(config),
            row_id_column: config.row_id_column.clone(),
            policy: config.on_malformed,
            records: BTreeMap::new(),
            skipped: ErrorCollector::new(),
            rows_read: 0,
            progress,
        }
    }

    /// Fold one input row into its identifier's record.
    ///
    /// New columns are appended to the record; a column that already exists
    /// is overwritten in place.
    ///
    /// # Errors
    /// [`PrepError::MalformedRow`] under [`RowPolicy::Fail`] when the row has
    /// no identifier or no usable period.
    pub fn ingest(&mut self, raw: &RawRecord) -> PrepResult<Ingested> {
        self.rows_read += 1;
        self.progress.observe(Phase::Parsing, self.rows_read);
        match self.narrow(raw) {
            Ok((id, row)) => Ok(self.merge(id, row)),
            Err(err) => {
                let id = raw.get(&self.row_id_column).filter(|v| !v.is_empty());
                handle_malformed(self.policy, err, id, &mut self.skipped)?;
                Ok(Ingested::Skipped)
            }
        }
    }

    /// Ingest every row of `rows`, stopping at the first fatal error.
    ///
    /// # Errors
    /// Propagates source errors and fatal [`ingest`](Self::ingest) errors.
    pub fn ingest_all<I>(&mut self, rows: I) -> PrepResult<()>
    where
        I: IntoIterator<Item = PrepResult<RawRecord>>,
    {
        for row in rows {
            self.ingest(&row?)?;
        }
        Ok(())
    }

    fn narrow(&self, raw: &RawRecord) -> PrepResult<(String, NarrowRecord)> {
        let id = raw
            .get(&self.row_id_column)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PrepError::malformed(
                    raw.line(),
                    format!("missing identifier column `{}`", self.row_id_column),
                )
            })?;
        let row = self.transformer.transform(raw)?;
        Ok((id.to_string(), row))
    }

    fn merge(&mut self, id: String, row: NarrowRecord) -> Ingested {
        let mut outcome = Ingested::Merged;
        let record = self.records.entry(id).or_insert_with_key(|id| {
            outcome = Ingested::Created;
            let mut seeded = AccumulatedRecord::new();
            seeded.insert(IDENTIFIER_KEY.to_string(), id.clone());
            seeded
        });
        record.extend(row);
        outcome
    }

    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Number of distinct identifiers seen so far.
    #[must_use]
    pub fn identifiers(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AccumulatedRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn skipped(&self) -> &ErrorCollector {
        &self.skipped
    }

    /// Freeze the records and fix the output column order.
    ///
    /// # Errors
    /// [`PrepError::EmptyDataset`] when no row was merged.
    pub fn finalize(self, schema: SchemaPolicy) -> PrepResult<WideTable<P>> {
        if self.records.is_empty() {
            return Err(PrepError::EmptyDataset);
        }
        let columns = column_order(self.records.values(), schema);
        info!(
            rows = self.rows_read,
            identifiers = self.records.len(),
            columns = columns.len(),
            skipped = self.skipped.error_count(),
            "input aggregated"
        );
        self.skipped.log_summary();
        Ok(WideTable {
            records: self.records,
            columns,
            skipped: self.skipped,
            rows_read: self.rows_read,
            progress: self.progress,
        })
    }
}

/// Output column order for records visited in identifier order.
///
/// The first record's keys come first, in insertion order. Under
/// [`SchemaPolicy::Union`] keys first seen in later records follow.
pub fn column_order<'a, I>(records: I, schema: SchemaPolicy) -> Vec<String>
where
    I: IntoIterator<Item = &'a AccumulatedRecord>,
{
    let mut records = records.into_iter();
    let Some(first) = records.next() else {
        return Vec::new();
    };
    let mut columns: IndexSet<&str> = first.keys().map(String::as_str).collect();
    if schema == SchemaPolicy::Union {
        for record in records {
            columns.extend(record.keys().map(String::as_str));
        }
    }
    columns.into_iter().map(str::to_string).collect()
}

/// Finalized wide records with a fixed column order.
pub struct WideTable<P: Progress = NoProgress> {
    records: BTreeMap<String, AccumulatedRecord>,
    columns: Vec<String>,
    skipped: ErrorCollector,
    rows_read: u64,
    progress: P,
}

impl<P: Progress> WideTable<P> {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Identifiers in ascending order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    #[must_use]
    pub fn skipped(&self) -> &ErrorCollector {
        &self.skipped
    }

    /// Values of `id`'s record in column order; absent columns are empty.
    #[must_use]
    pub fn emit_row(&self, id: &str) -> Option<Vec<&str>> {
        self.records.get(id).map(|r| project(r, &self.columns))
    }

    /// Header, then one line per identifier in ascending order.
    ///
    /// Rows are written one at a time, so a slow sink holds back the loop.
    ///
    /// # Returns
    /// The number of data rows written.
    ///
    /// # Errors
    /// Returns an error if the sink rejects a write.
    pub fn write_csv<W: Write>(&mut self, writer: &mut csv::Writer<W>) -> PrepResult<u64> {
        writer.write_record(&self.columns)?;
        let mut written = 0u64;
        for record in self.records.values() {
            self.progress.observe(Phase::Writing, written);
            writer.write_record(project(record, &self.columns))?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }
}

fn project<'a>(record: &'a AccumulatedRecord, columns: &[String]) -> Vec<&'a str> {
    columns
        .iter()
        .map(|c| record.get(c).map_or("", String::as_str))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnMap, Flavor};

    fn config() -> ShapeConfig {
        ShapeConfig::new(ColumnMap::from_pairs([("ef", "ef")]), Flavor::Raw)
    }

    fn row(id: &str, year: &str, ef: &str) -> RawRecord {
        RawRecord::from_pairs([("GEOID", id), ("year", year), ("ef", ef)])
    }

    #[test]
    fn test_ingest_reports_created_then_merged() {
        let mut agg = Aggregator::new(&config());
        assert_eq!(agg.ingest(&row("001", "2000", "5")).unwrap(), Ingested::Created);
        assert_eq!(agg.ingest(&row("001", "2010", "7")).unwrap(), Ingested::Merged);
        let rec = agg.get("001").unwrap();
        let keys: Vec<_> = rec.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["GEOID", "ef-00", "ef-10"]);
    }

    #[test]
    fn test_overwrite_keeps_column_position() {
        let mut agg = Aggregator::new(&config());
        agg.ingest(&row("001", "2000", "5")).unwrap();
        agg.ingest(&row("001", "2010", "7")).unwrap();
        agg.ingest(&row("001", "2000", "6")).unwrap();
        let rec = agg.get("001").unwrap();
        assert_eq!(rec.get_index(1), Some((&"ef-00".to_string(), &"6".to_string())));
    }

    #[test]
    fn test_first_record_schema_projects_later_records() {
        let mut agg = Aggregator::new(&config());
        agg.ingest(&row("002", "2000", "3")).unwrap();
        agg.ingest(&row("001", "2010", "7")).unwrap();
        let table = agg.finalize(SchemaPolicy::FirstRecord).unwrap();
        assert_eq!(table.columns(), ["GEOID", "ef-10"]);
        assert_eq!(table.emit_row("002"), Some(vec!["002", ""]));
    }

    #[test]
    fn test_union_schema_appends_late_columns() {
        let mut agg = Aggregator::new(&config());
        agg.ingest(&row("002", "2000", "3")).unwrap();
        agg.ingest(&row("001", "2010", "7")).unwrap();
        let table = agg.finalize(SchemaPolicy::Union).unwrap();
        assert_eq!(table.columns(), ["GEOID", "ef-10", "ef-00"]);
        assert_eq!(table.emit_row("002"), Some(vec!["002", "", "3"]));
        assert_eq!(table.emit_row("404"), None);
    }

    #[test]
    fn test_empty_input_cannot_be_finalized() {
        let agg = Aggregator::new(&config());
        assert!(matches!(
            agg.finalize(SchemaPolicy::Union),
            Err(PrepError::EmptyDataset)
        ));
    }
}
