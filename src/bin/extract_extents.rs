//! `extract-extents`: min, max, q1 and q99 for every numeric column of a CSV.

use anyhow::{Context, Result};
use clap::Parser;
use evictprep::{DEFAULT_EXCLUDED, ExecMode, ExtentsConfig, SchemaPolicy, logging, run_extents};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "extract-extents")]
#[command(about = "Write min, max, 1st and 99th percentile of each numeric column")]
#[command(version)]
struct Args {
    /// Input CSV with a header row (may be compressed)
    input: PathBuf,

    /// Output CSV; stdout when omitted
    output: Option<PathBuf>,

    /// Columns to leave out (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_EXCLUDED.map(String::from))]
    exclude: Vec<String>,

    /// Which rows define the column set
    #[arg(long, value_enum, default_value_t = SchemaPolicy::FirstRecord)]
    schema: SchemaPolicy,

    /// Reduce row partitions in parallel
    #[arg(long)]
    parallel: bool,

    /// Write a JSON run summary to this file
    #[arg(long)]
    metrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let mode = if args.parallel {
        ExecMode::Parallel { partitions: None }
    } else {
        ExecMode::Sequential
    };
    let config = ExtentsConfig::default()
        .with_excluded(args.exclude)
        .with_schema(args.schema)
        .with_mode(mode);

    let metrics = run_extents(&config, &args.input, args.output.as_deref())
        .with_context(|| format!("extract extents from {}", args.input.display()))?;
    metrics.log_summary();

    if let Some(path) = args.metrics {
        metrics
            .save_to_file(&path)
            .with_context(|| format!("write metrics {}", path.display()))?;
    }
    Ok(())
}
