use chrono::{TimeZone, Utc};

use split_column::config::JobConfig;
use split_column::ingestion::csv::{ingest_csv_from_path, ingest_csv_from_reader, CsvRecords};
use split_column::types::{Schema, Value};
use split_column::SplitError;

fn orders_schema() -> Schema {
    JobConfig::from_path("tests/fixtures/orders_job.json")
        .unwrap()
        .input_schema()
        .unwrap()
}

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes())
}

fn utf8(s: &str) -> Value {
    Value::Utf8(s.to_string())
}

#[test]
fn orders_fixture_keeps_target_text_raw_and_blank_cells_null() {
    let ds = ingest_csv_from_path("tests/fixtures/orders.csv", &orders_schema()).unwrap();

    assert_eq!(ds.row_count(), 5);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            utf8("widget|3|9.99|true|2024-01-05"),
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()),
            utf8("first"),
        ]
    );
    // Blank note, blank target and blank timestamp are all read as null.
    assert_eq!(ds.rows[1][3], Value::Null);
    assert_eq!(ds.rows[3][1], Value::Null);
    assert_eq!(ds.rows[4][2], Value::Null);
    assert_eq!(ds.rows[4][1], utf8("bolt|12|0.25|yes|2024-01-09"));
}

#[test]
fn orders_stream_in_bounded_batches() {
    let mut records = CsvRecords::from_path("tests/fixtures/orders.csv", &orders_schema()).unwrap();

    let sizes: Vec<usize> = std::iter::from_fn(|| {
        let batch = records.next_batch(2).unwrap();
        (!batch.is_empty()).then_some(batch.len())
    })
    .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn reordered_headers_map_onto_schema_order() {
    let input = "note,line,extra,placed_at,order_id\nhi,a|b,ignored,2024-02-01T00:00:00Z,9\n";

    let ds = ingest_csv_from_reader(reader(input), &orders_schema()).unwrap();
    assert_eq!(
        ds.rows,
        vec![vec![
            Value::Int64(9),
            utf8("a|b"),
            Value::Timestamp(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            utf8("hi"),
        ]]
    );
}

#[test]
fn missing_target_column_is_schema_mismatch() {
    let input = "order_id,placed_at,note\n1,,x\n";

    let err = ingest_csv_from_reader(reader(input), &orders_schema()).unwrap_err();
    assert!(matches!(err, SplitError::SchemaMismatch { .. }));
    assert!(err.to_string().contains("missing required column 'line'"));
}

#[test]
fn unparsable_order_id_reports_row_and_column() {
    let input = "order_id,line,placed_at,note\n1,a|b,,\nten,c|d,,\n";

    let err = ingest_csv_from_reader(reader(input), &orders_schema()).unwrap_err();
    match err {
        SplitError::ParseError { row, column, raw, .. } => {
            assert_eq!(row, 3);
            assert_eq!(column, "order_id");
            assert_eq!(raw, "ten");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
