//! CSV ingestion implementation.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{SplitError, SplitResult};
use crate::timestamp::TimestampParser;
use crate::types::{DataSet, DataType, Schema, Value};

/// Streaming iterator of typed records read from a CSV source.
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ; extra columns are ignored).
/// - Cells that are empty after trimming become [`Value::Null`].
/// - Other cells are parsed according to the schema field type. `string` cells keep their raw
///   text, untrimmed.
pub struct CsvRecords<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    schema: Schema,
    col_idxs: Vec<usize>,
    timestamps: TimestampParser,
    row_idx0: usize,
}

impl CsvRecords<File> {
    /// Open `path` and map its header onto `schema`.
    pub fn from_path(path: impl AsRef<Path>, schema: &Schema) -> SplitResult<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        Self::from_csv_reader(rdr, schema)
    }
}

impl<R: Read> CsvRecords<R> {
    /// Wrap an existing CSV reader (which must be configured with headers).
    pub fn from_csv_reader(mut rdr: csv::Reader<R>, schema: &Schema) -> SplitResult<Self> {
        let headers = rdr.headers()?.clone();

        // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
        let mut col_idxs = Vec::with_capacity(schema.len());
        for field in &schema.fields {
            match headers.iter().position(|h| h == field.name) {
                Some(idx) => col_idxs.push(idx),
                None => {
                    return Err(SplitError::schema_mismatch(format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    )));
                }
            }
        }

        Ok(Self {
            records: rdr.into_records(),
            schema: schema.clone(),
            col_idxs,
            timestamps: TimestampParser::default(),
            row_idx0: 0,
        })
    }

    /// Schema the records conform to.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Pull up to `max` records. An empty batch means the source is exhausted.
    pub fn next_batch(&mut self, max: usize) -> SplitResult<Vec<Vec<Value>>> {
        let mut batch = Vec::with_capacity(max);
        for record in self.by_ref().take(max) {
            batch.push(record?);
        }
        Ok(batch)
    }

    fn parse_record(&self, user_row: usize, record: &csv::StringRecord) -> SplitResult<Vec<Value>> {
        let mut row: Vec<Value> = Vec::with_capacity(self.schema.len());
        for (field, &csv_idx) in self.schema.fields.iter().zip(self.col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(
                user_row,
                &field.name,
                field.data_type,
                raw,
                &self.timestamps,
            )?);
        }
        Ok(row)
    }
}

impl<R: Read> Iterator for CsvRecords<R> {
    type Item = SplitResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.records.next()?;
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = self.row_idx0 + 2;
        self.row_idx0 += 1;
        Some(
            result
                .map_err(SplitError::from)
                .and_then(|record| self.parse_record(user_row, &record)),
        )
    }
}

/// Ingest a CSV file into an in-memory [`DataSet`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> SplitResult<DataSet> {
    let records = CsvRecords::from_path(path, schema)?;
    collect(records)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: Read>(rdr: csv::Reader<R>, schema: &Schema) -> SplitResult<DataSet> {
    let records = CsvRecords::from_csv_reader(rdr, schema)?;
    collect(records)
}

fn collect<R: Read>(records: CsvRecords<R>) -> SplitResult<DataSet> {
    let schema = records.schema().clone();
    let rows = records.collect::<SplitResult<Vec<_>>>()?;
    Ok(DataSet::new(schema, rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
    timestamps: &TimestampParser,
) -> SplitResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| SplitError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
        DataType::Timestamp => parse_timestamp(trimmed, timestamps)
            .map(Value::Timestamp)
            .map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

fn parse_timestamp(
    s: &str,
    fallback: &TimestampParser,
) -> Result<chrono::DateTime<chrono::Utc>, String> {
    match chrono::DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&chrono::Utc)),
        Err(_) => fallback
            .parse(s)
            .map_err(|e| format!("expected RFC 3339 or '{}': {e}", fallback.format())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::CsvRecords;
    use crate::types::{DataType, Field, Schema, Value};

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    #[test]
    fn next_batch_streams_in_bounded_chunks() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let mut records = CsvRecords::from_csv_reader(reader("id\n1\n2\n3\n"), &schema).unwrap();

        assert_eq!(records.next_batch(2).unwrap().len(), 2);
        assert_eq!(records.next_batch(2).unwrap(), vec![vec![Value::Int64(3)]]);
        assert!(records.next_batch(2).unwrap().is_empty());
    }

    #[test]
    fn timestamps_accept_rfc3339_and_default_format() {
        let schema = Schema::new(vec![Field::new("at", DataType::Timestamp)]);
        let input = "at\n2024-01-02T03:04:05Z\n2024-01-02 12:04:05 +0900\n";
        let rows: Vec<_> = CsvRecords::from_csv_reader(reader(input), &schema)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        let expected = Value::Timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(rows, vec![vec![expected.clone()], vec![expected]]);
    }

    #[test]
    fn strings_keep_whitespace_and_blank_cells_are_null() {
        let schema = Schema::new(vec![
            Field::new("s", DataType::Utf8),
            Field::new("n", DataType::Int64),
        ]);
        let rows: Vec<_> = CsvRecords::from_csv_reader(reader("s,n\n\" a,b \", \n"), &schema)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows, vec![vec![Value::Utf8(" a,b ".to_string()), Value::Null]]);
    }

    #[test]
    fn parse_errors_report_user_row_numbers() {
        let schema = Schema::new(vec![Field::new("flag", DataType::Bool)]);
        let mut records = CsvRecords::from_csv_reader(reader("flag\ntrue\nmaybe\n"), &schema).unwrap();
        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("at row 3 column 'flag'"));
    }
}
