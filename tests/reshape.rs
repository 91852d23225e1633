use anyhow::Result;
use evictprep::testing::*;
use evictprep::{
    Aggregator, ColumnMap, Flavor, Ingested, PrepError, RawRecord, RowPolicy, SchemaPolicy,
    ShapeConfig,
};

fn ef_config() -> ShapeConfig {
    ShapeConfig::new(ColumnMap::from_pairs([("ef", "ef")]), Flavor::Raw)
}

#[test]
fn test_two_identifiers_become_wide_rows() -> Result<()> {
    let rows = rows_from_csv("GEOID,year,ef\n001,2000,5\n001,2010,7\n002,2000,3\n");
    let mut agg = Aggregator::new(&ef_config());
    agg.ingest_all(rows.into_iter().map(Ok))?;
    let table = agg.finalize(SchemaPolicy::Union)?;

    assert_eq!(table.columns(), ["GEOID", "ef-00", "ef-10"]);
    assert_eq!(table.emit_row("001"), Some(vec!["001", "5", "7"]));
    assert_eq!(table.emit_row("002"), Some(vec!["002", "3", ""]));
    Ok(())
}

#[test]
fn test_written_csv_matches_expected_layout() -> Result<()> {
    let rows = rows_from_csv("GEOID,year,ef\n002,2000,3\n001,2000,5\n001,2010,7\n");
    let mut agg = Aggregator::new(&ef_config());
    agg.ingest_all(rows.into_iter().map(Ok))?;
    let mut table = agg.finalize(SchemaPolicy::Union)?;

    let mut writer = evictprep::io::csv::csv_writer(Vec::new());
    let written = table.write_csv(&mut writer)?;
    let bytes = evictprep::io::csv::finish_writer(writer)?;

    assert_eq!(written, 2);
    // 002 arrived first, so its columns lead the header
    assert_eq!(
        String::from_utf8(bytes)?,
        "GEOID,ef-00,ef-10\n001,5,7\n002,3,\n"
    );
    Ok(())
}

#[test]
fn test_identifiers_are_emitted_in_ascending_order() -> Result<()> {
    let mut agg = Aggregator::new(&ShapeConfig::new(sample_column_map(), Flavor::Raw));
    agg.ingest_all(rows_from_csv(SAMPLE_LONG_CSV).into_iter().map(Ok))?;
    let table = agg.finalize(SchemaPolicy::Union)?;

    let ids: Vec<&str> = table.identifiers().collect();
    assert_eq!(ids, vec!["01001", "01003", "01005"]);
    assert_strictly_ascending(&ids);
    Ok(())
}

#[test]
fn test_every_row_has_as_many_fields_as_the_header() -> Result<()> {
    for schema in [SchemaPolicy::FirstRecord, SchemaPolicy::Union] {
        let mut agg = Aggregator::new(&ShapeConfig::new(sample_column_map(), Flavor::Raw));
        agg.ingest_all(rows_from_csv(SAMPLE_LONG_CSV).into_iter().map(Ok))?;
        let table = agg.finalize(schema)?;
        let width = table.columns().len();
        for id in table.identifiers() {
            assert_eq!(table.emit_row(id).map(|r| r.len()), Some(width), "{id}");
        }
    }
    Ok(())
}

#[test]
fn test_time_invariant_columns_are_copied_once() -> Result<()> {
    let mut agg = Aggregator::new(&ShapeConfig::new(sample_column_map(), Flavor::Raw));
    agg.ingest_all(rows_from_csv(SAMPLE_LONG_CSV).into_iter().map(Ok))?;

    let rec = agg.get("01001").expect("01001 aggregated");
    assert_eq!(rec.get("name").map(String::as_str), Some("Autauga County"));
    assert_eq!(rec.get("parent_location").map(String::as_str), Some("Alabama"));
    assert_eq!(rec.get("er-16").map(String::as_str), Some("1.52"));
    assert_eq!(rec.get("p-00").map(String::as_str), Some("43671"));
    assert!(rec.get("name-16").is_none());
    // unmapped input columns never reach the output
    assert!(rec.keys().all(|k| !k.starts_with("low-flag")));
    Ok(())
}

#[test]
fn test_time_invariant_set_uses_mapped_names() -> Result<()> {
    let config = ShapeConfig::new(
        ColumnMap::from_pairs([("county", "label"), ("ef", "ef")]),
        Flavor::Raw,
    )
    .with_time_invariant(["label"]);
    let mut agg = Aggregator::new(&config);
    agg.ingest(&RawRecord::from_pairs([
        ("GEOID", "9"),
        ("year", "2005"),
        ("county", "Kent"),
        ("ef", "4"),
    ]))?;

    let keys: Vec<_> = agg.get("9").expect("row").keys().cloned().collect();
    assert_eq!(keys, vec!["GEOID", "label", "ef-05"]);
    Ok(())
}

#[test]
fn test_modelled_flavor_keys_rows_by_id() -> Result<()> {
    let config = ShapeConfig::new(ColumnMap::from_pairs([("ef", "ef")]), Flavor::Modelled);
    let mut agg = Aggregator::new(&config);
    agg.ingest(&RawRecord::from_pairs([("id", "42"), ("year", "2001"), ("ef", "1")]))?;
    let table = agg.finalize(SchemaPolicy::Union)?;
    // the identifier is always stored under GEOID
    assert_eq!(table.columns(), ["GEOID", "ef-01"]);
    assert_eq!(table.emit_row("42"), Some(vec!["42", "1"]));
    Ok(())
}

#[test]
fn test_malformed_rows_are_skipped_under_warn() -> Result<()> {
    let rows = rows_from_csv("GEOID,year,ef\n001,2000,5\n,2010,9\n002,7,3\n003,2010,1\n");
    let mut agg = Aggregator::new(&ef_config());
    let outcomes = rows
        .iter()
        .map(|r| agg.ingest(r))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(
        outcomes,
        vec![
            Ingested::Created,
            Ingested::Skipped,
            Ingested::Skipped,
            Ingested::Created
        ]
    );
    let skipped = agg.skipped().rows();
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0].line, 3);
    assert_eq!(skipped[0].identifier, None);
    assert_eq!(skipped[1].identifier.as_deref(), Some("002"));
    assert_eq!(agg.rows_read(), 4);
    assert_eq!(agg.identifiers(), 2);
    Ok(())
}

#[test]
fn test_malformed_row_aborts_under_fail() {
    let config = ef_config().with_row_policy(RowPolicy::Fail);
    let rows = rows_from_csv("GEOID,year,ef\n001,2000,5\n002,,3\n");
    let mut agg = Aggregator::new(&config);
    let err = agg.ingest_all(rows.into_iter().map(Ok)).unwrap_err();
    assert!(matches!(err, PrepError::MalformedRow { line: 3, .. }));
}

#[test]
fn test_all_rows_malformed_is_an_empty_dataset() {
    let rows = rows_from_csv("GEOID,year,ef\n,2000,5\n");
    let mut agg = Aggregator::new(&ef_config().with_row_policy(RowPolicy::Skip));
    agg.ingest_all(rows.into_iter().map(Ok)).unwrap();
    assert!(matches!(
        agg.finalize(SchemaPolicy::Union),
        Err(PrepError::EmptyDataset)
    ));
}

#[test]
fn test_skipped_rows_keep_a_bounded_sample() {
    let config = ef_config().with_row_policy(RowPolicy::Skip);
    let mut agg = Aggregator::new(&config);
    let rows = (0..50_000u64).map(|i| {
        let id = format!("{:05}", i % 100);
        Ok(RawRecord::from_pairs([("GEOID", id.as_str()), ("yr", "2000"), ("ef", "1")])
            .with_line(i + 2))
    });
    agg.ingest_all(rows).unwrap();

    assert_eq!(agg.identifiers(), 0);
    assert_eq!(agg.skipped().error_count(), 50_000);
    assert_eq!(
        agg.skipped().rows().len(),
        evictprep::validation::DEFAULT_SAMPLE_LIMIT
    );
    assert_eq!(agg.skipped().rows()[0].line, 2);
}
