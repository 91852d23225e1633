//! Run configuration for both pipelines.
//!
//! - [`Flavor`] selects the input variant (raw vs modelled), which fixes the
//!   identifier column and the default column-map file.
//! - [`ColumnMap`] is the externally supplied input → output column mapping,
//!   loaded from a JSON object of strings.
//! - [`ShapeConfig`] and [`ExtentsConfig`] bundle everything a run needs.

use crate::error::{PrepError, PrepResult};
use crate::runner::ExecMode;
use crate::validation::RowPolicy;
use clap::ValueEnum;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key under which every accumulated wide record stores its identifier.
pub const IDENTIFIER_KEY: &str = "GEOID";

/// Output base names that never receive a period suffix.
pub const DEFAULT_TIME_INVARIANT: [&str; 3] = ["id", "name", "parent_location"];

/// Columns skipped by extent extraction.
pub const DEFAULT_EXCLUDED: [&str; 3] = ["GEOID", "n", "pl"];

/// Column holding the period (year) of a long-format row.
pub const DEFAULT_PERIOD_COLUMN: &str = "year";

/// Wall-clock interval between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Input flavor of the reshape pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Flavor {
    /// Source data keyed by `GEOID`.
    #[default]
    Raw,
    /// Modelled data keyed by `id`.
    Modelled,
}

impl Flavor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Modelled => "modelled",
        }
    }

    /// Name of the column carrying the row identifier.
    #[must_use]
    pub const fn row_id_column(self) -> &'static str {
        match self {
            Self::Raw => "GEOID",
            Self::Modelled => "id",
        }
    }

    /// `<assets_dir>/column-map-<flavor>.json`
    #[must_use]
    pub fn column_map_path(self, assets_dir: &Path) -> PathBuf {
        assets_dir.join(format!("column-map-{}.json", self.as_str()))
    }
}

/// How the output column set is derived once all rows are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SchemaPolicy {
    /// Columns of the first record only; later records are projected onto it.
    #[value(name = "first")]
    FirstRecord,
    /// First record's columns, then columns first seen in later records.
    #[default]
    Union,
}

/// Input column → output base column name.
///
/// Columns absent from the map (or mapped to an empty name) are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(IndexMap<String, String>);

impl ColumnMap {
    #[must_use]
    pub fn new(map: IndexMap<String, String>) -> Self {
        Self(map)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Parse a JSON object of string → string.
    ///
    /// # Errors
    /// [`PrepError::Configuration`] if the text is not such an object or maps no
    /// columns at all.
    pub fn from_json_str(text: &str) -> PrepResult<Self> {
        let map: IndexMap<String, String> = serde_json::from_str(text).map_err(|e| {
            PrepError::Configuration(format!(
                "column map must be a JSON object of string values: {e}"
            ))
        })?;
        if map.values().all(String::is_empty) {
            return Err(PrepError::Configuration(
                "column map does not map any columns".into(),
            ));
        }
        Ok(Self(map))
    }

    /// Load a column map file.
    ///
    /// # Errors
    /// [`PrepError::Configuration`] when the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> PrepResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PrepError::Configuration(format!("cannot read column map {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text).map_err(|e| match e {
            PrepError::Configuration(msg) => {
                PrepError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Mapped output name for an input column.
    #[must_use]
    pub fn get(&self, input: &str) -> Option<&str> {
        self.0
            .get(input)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Settings for the long → wide reshape pipeline.
#[derive(Debug, Clone)]
pub struct ShapeConfig {
    pub column_map: ColumnMap,
    pub row_id_column: String,
    pub period_column: String,
    pub time_invariant: HashSet<String>,
    pub schema: SchemaPolicy,
    pub on_malformed: RowPolicy,
    pub progress_interval: Duration,
}

impl ShapeConfig {
    /// Defaults for `flavor`: its identifier column, `year` as the period
    /// column, the standard time-invariant set, union schema, skip-and-warn.
    #[must_use]
    pub fn new(column_map: ColumnMap, flavor: Flavor) -> Self {
        Self {
            column_map,
            row_id_column: flavor.row_id_column().to_string(),
            period_column: DEFAULT_PERIOD_COLUMN.to_string(),
            time_invariant: DEFAULT_TIME_INVARIANT.iter().map(|s| (*s).to_string()).collect(),
            schema: SchemaPolicy::Union,
            on_malformed: RowPolicy::Warn,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_row_id_column(mut self, column: impl Into<String>) -> Self {
        self.row_id_column = column.into();
        self
    }

    #[must_use]
    pub fn with_period_column(mut self, column: impl Into<String>) -> Self {
        self.period_column = column.into();
        self
    }

    #[must_use]
    pub fn with_time_invariant<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.time_invariant = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: SchemaPolicy) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub const fn with_row_policy(mut self, policy: RowPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Settings for extent extraction.
#[derive(Debug, Clone)]
pub struct ExtentsConfig {
    pub excluded: HashSet<String>,
    pub schema: SchemaPolicy,
    pub mode: ExecMode,
}

impl Default for ExtentsConfig {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED.iter().map(|s| (*s).to_string()).collect(),
            schema: SchemaPolicy::FirstRecord,
            mode: ExecMode::Sequential,
        }
    }
}

impl ExtentsConfig {
    #[must_use]
    pub fn with_excluded<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_schema(mut self, schema: SchemaPolicy) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_selects_identifier_and_map_file() {
        assert_eq!(Flavor::Raw.row_id_column(), "GEOID");
        assert_eq!(Flavor::Modelled.row_id_column(), "id");
        assert_eq!(
            Flavor::Modelled.column_map_path(Path::new("assets")),
            Path::new("assets").join("column-map-modelled.json")
        );
    }

    #[test]
    fn test_empty_mapping_is_treated_as_absent() {
        let map = ColumnMap::from_pairs([("ef", "ef"), ("junk", "")]);
        assert_eq!(map.get("ef"), Some("ef"));
        assert_eq!(map.get("junk"), None);
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_rejects_non_string_values() {
        let err = ColumnMap::from_json_str(r#"{"ef": 3}"#).unwrap_err();
        assert!(matches!(err, PrepError::Configuration(_)));
    }

    #[test]
    fn test_rejects_map_without_columns() {
        let err = ColumnMap::from_json_str("{}").unwrap_err();
        assert!(matches!(err, PrepError::Configuration(_)));
    }
}
