use anyhow::Result;
use evictprep::combiners::{CombineFn, Extent};
use evictprep::testing::*;
use evictprep::{
    ExecMode, ExtentsConfig, NumericRecord, PrepError, SchemaPolicy, coerce_numeric,
    reduce_extents,
};

fn column(name: &str, values: impl IntoIterator<Item = f64>) -> Vec<NumericRecord> {
    values
        .into_iter()
        .map(|v| std::iter::once((name.to_string(), v)).collect())
        .collect()
}

#[test]
fn test_one_to_hundred_interpolates_percentiles() -> Result<()> {
    let rows = column("x", (1..=100).map(f64::from));
    let out = reduce_extents(&rows, &ExtentsConfig::default())?;

    assert_eq!(out.len(), 1);
    let x = &out[0];
    assert_eq!(x.id, "x");
    assert_eq!(x.min, 1.0);
    assert_eq!(x.max, 100.0);
    assert_close(x.q1, 1.99, 1e-9);
    assert_close(x.q99, 99.01, 1e-9);
    Ok(())
}

#[test]
fn test_extents_are_ordered() -> Result<()> {
    let values = [12.0, -3.5, 7.25, 0.0, 99.0, 41.0, -3.5, 18.0];
    let out = reduce_extents(&column("v", values), &ExtentsConfig::default())?;
    let v = &out[0];
    assert!(v.min <= v.q1 && v.q1 <= v.q99 && v.q99 <= v.max, "{v:?}");
    Ok(())
}

#[test]
fn test_single_value_collapses_all_statistics() -> Result<()> {
    let out = reduce_extents(&column("x", [5.0]), &ExtentsConfig::default())?;
    let x = &out[0];
    assert_eq!((x.min, x.max, x.q1, x.q99), (5.0, 5.0, 5.0, 5.0));
    Ok(())
}

#[test]
fn test_empty_input_is_an_error() {
    let err = reduce_extents(&[], &ExtentsConfig::default()).unwrap_err();
    assert!(matches!(err, PrepError::EmptyDataset));
}

#[test]
fn test_non_numeric_and_excluded_columns_are_left_out() -> Result<()> {
    let rows: Vec<NumericRecord> = rows_from_csv(SAMPLE_LONG_CSV)
        .iter()
        .map(coerce_numeric)
        .collect();
    let out = reduce_extents(&rows, &ExtentsConfig::default())?;
    let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "year",
            "population",
            "eviction-filings",
            "eviction-rate",
            "low-flag"
        ]
    );

    let filings = out.iter().find(|r| r.id == "eviction-filings").expect("filings");
    assert_eq!(filings.min, 20.0);
    assert_eq!(filings.max, 412.0);
    Ok(())
}

#[test]
fn test_column_missing_from_first_record_needs_union_schema() -> Result<()> {
    let mut rows = column("a", [1.0, 2.0]);
    rows[1].insert("late".to_string(), 8.0);

    let first = reduce_extents(&rows, &ExtentsConfig::default())?;
    assert_eq!(first.len(), 1);

    let union = reduce_extents(
        &rows,
        &ExtentsConfig::default().with_schema(SchemaPolicy::Union),
    )?;
    assert_eq!(union.len(), 2);
    assert_eq!(union[1].id, "late");
    assert_eq!(union[1].q99, 8.0);
    Ok(())
}

#[test]
fn test_parallel_reduction_matches_sequential() -> Result<()> {
    let rows: Vec<NumericRecord> = (0..1000u32)
        .map(|i| {
            let mut r = NumericRecord::new();
            r.insert("a".into(), f64::from((i * 7919) % 1000));
            if i % 3 != 0 {
                r.insert("b".into(), f64::from(i) / 10.0);
            }
            r
        })
        .collect();
    let seq = reduce_extents(&rows, &ExtentsConfig::default())?;
    for partitions in [None, Some(1), Some(3), Some(64)] {
        let cfg = ExtentsConfig::default().with_mode(ExecMode::Parallel { partitions });
        assert_eq!(reduce_extents(&rows, &cfg)?, seq, "partitions = {partitions:?}");
    }
    Ok(())
}

#[test]
fn test_merged_partials_equal_a_single_pass() {
    let extent = Extent::default();
    let mut whole = extent.create();
    let mut left = extent.create();
    let mut right = extent.create();
    for i in 0..50 {
        let v = f64::from(i).sin() * 100.0;
        extent.add_input(&mut whole, v);
        if i < 20 {
            extent.add_input(&mut left, v);
        } else {
            extent.add_input(&mut right, v);
        }
    }
    extent.merge(&mut left, right);
    assert_eq!(extent.finish(left), extent.finish(whole));
}
