//! `shape-data`: reshape long eviction data (one row per region and year)
//! into wide data (one row per region, one column per variable and year).

use anyhow::{Context, Result};
use clap::Parser;
use evictprep::{
    ColumnMap, DEFAULT_PERIOD_COLUMN, DEFAULT_TIME_INVARIANT, Flavor, RowPolicy, SchemaPolicy,
    ShapeConfig, logging, run_shape,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "shape-data")]
#[command(about = "Reshape long-format data into one row per identifier with year-suffixed columns")]
#[command(version)]
struct Args {
    /// Input CSV with a header row (may be compressed)
    input: PathBuf,

    /// Output CSV; stdout when omitted
    output: Option<PathBuf>,

    /// Input flavor; selects the identifier column and the column map
    #[arg(long, value_enum, env = "DATA_INPUT_TYPE", default_value_t = Flavor::Raw)]
    flavor: Flavor,

    /// Directory holding column-map-<flavor>.json
    #[arg(long, default_value = "assets")]
    assets_dir: PathBuf,

    /// Column map file, overriding the flavor default
    #[arg(long)]
    column_map: Option<PathBuf>,

    /// Output columns copied without a year suffix (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_TIME_INVARIANT.map(String::from))]
    time_invariant: Vec<String>,

    /// Column holding the year of each row
    #[arg(long, default_value = DEFAULT_PERIOD_COLUMN)]
    period_column: String,

    /// How the output header is derived
    #[arg(long, value_enum, default_value_t = SchemaPolicy::Union)]
    schema: SchemaPolicy,

    /// What to do with rows lacking an identifier or year
    #[arg(long, value_enum, default_value_t = RowPolicy::Warn)]
    on_malformed: RowPolicy,

    /// Seconds between progress reports when writing to a file
    #[arg(long, default_value_t = 10)]
    progress_interval: u64,

    /// Write a JSON run summary to this file
    #[arg(long)]
    metrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let map_path = args
        .column_map
        .clone()
        .unwrap_or_else(|| args.flavor.column_map_path(&args.assets_dir));
    let column_map = ColumnMap::from_json_file(&map_path)
        .with_context(|| format!("load column map for {} input", args.flavor.as_str()))?;

    let config = ShapeConfig::new(column_map, args.flavor)
        .with_time_invariant(args.time_invariant)
        .with_period_column(args.period_column)
        .with_schema(args.schema)
        .with_row_policy(args.on_malformed)
        .with_progress_interval(Duration::from_secs(args.progress_interval));

    let metrics = run_shape(&config, &args.input, args.output.as_deref())
        .with_context(|| format!("reshape {}", args.input.display()))?;
    metrics.log_summary();

    if let Some(path) = args.metrics {
        metrics
            .save_to_file(&path)
            .with_context(|| format!("write metrics {}", path.display()))?;
    }
    Ok(())
}
