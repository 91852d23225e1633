//! Raw CSV rows as produced by the row source.
//!
//! A [`RawRecord`] is a view of one CSV line keyed by header name. All records
//! read from one file share a single [`Header`] behind an `Arc`, so a row costs
//! only its field values.

use csv::StringRecord;
use std::collections::HashMap;
use std::sync::Arc;

/// Column names of a CSV file, in file order, with a name → position index.
///
/// When a name appears more than once, lookups resolve to the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, index }
    }

    /// Build a header from the first record of a CSV reader.
    #[must_use]
    pub fn from_csv(record: &StringRecord) -> Self {
        Self::new(record.iter())
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One input row: column name → raw string value.
#[derive(Debug, Clone)]
pub struct RawRecord {
    header: Arc<Header>,
    values: StringRecord,
    line: u64,
}

impl RawRecord {
    /// Wrap a parsed CSV record. `line` is the 1-based line number in the source.
    #[must_use]
    pub fn new(header: Arc<Header>, values: StringRecord, line: u64) -> Self {
        Self {
            header,
            values,
            line,
        }
    }

    /// Build a standalone record from `(column, value)` pairs.
    ///
    /// ```
    /// use evictprep::RawRecord;
    ///
    /// let row = RawRecord::from_pairs([("GEOID", "001"), ("year", "2000")]);
    /// assert_eq!(row.get("year"), Some("2000"));
    /// assert_eq!(row.get("ef"), None);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut names = Vec::new();
        let mut values = StringRecord::new();
        for (k, v) in pairs {
            names.push(k.into());
            values.push_field(v.as_ref());
        }
        Self::new(Arc::new(Header::new(names)), values, 0)
    }

    /// Same record, reported at a different source line.
    #[must_use]
    pub fn with_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    /// Value of `column`, or `None` when the column is absent from the header.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .position(column)
            .and_then(|i| self.values.get(i))
    }

    #[must_use]
    pub const fn line(&self) -> u64 {
        self.line
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
