//! CSV sink.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::SecondsFormat;

use crate::error::{SplitError, SplitResult};
use crate::types::{Schema, Value};

use super::RecordSink;

/// Writes records as CSV rows, preceded by a header row of output field names.
///
/// Null values are written as empty cells; timestamps as RFC 3339 in UTC.
pub struct CsvSink<W: Write> {
    writer: Option<csv::Writer<W>>,
    width: usize,
    pending: Option<Vec<String>>,
}

impl CsvSink<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn from_path(path: impl AsRef<Path>, schema: &Schema) -> SplitResult<Self> {
        let file = File::create(path)?;
        Self::from_writer(file, schema)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap `writer` and write the header row.
    pub fn from_writer(writer: W, schema: &Schema) -> SplitResult<Self> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(schema.field_names())?;
        Ok(Self {
            writer: Some(wtr),
            width: schema.len(),
            pending: None,
        })
    }

    /// Flush and hand back the underlying writer. Returns `None` once closed.
    pub fn into_inner(mut self) -> SplitResult<Option<W>> {
        match self.writer.take() {
            Some(wtr) => wtr
                .into_inner()
                .map(Some)
                .map_err(|e| SplitError::Io(e.into_error())),
            None => Ok(None),
        }
    }

    fn writer_mut(&mut self, operation: &'static str) -> SplitResult<&mut csv::Writer<W>> {
        self.writer.as_mut().ok_or(SplitError::InvalidState {
            state: "closed",
            operation,
        })
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn begin_record(&mut self) -> SplitResult<()> {
        self.writer_mut("begin a record on")?;
        self.pending = Some(vec![String::new(); self.width]);
        Ok(())
    }

    fn set_value(&mut self, position: usize, value: Value) -> SplitResult<()> {
        let width = self.width;
        let row = self
            .pending
            .as_mut()
            .ok_or_else(|| SplitError::schema_mismatch("set_value called outside a record"))?;
        let cell = row.get_mut(position).ok_or_else(|| {
            SplitError::schema_mismatch(format!(
                "position {position} is out of range for a record of {width} fields"
            ))
        })?;
        *cell = render_cell(&value);
        Ok(())
    }

    fn commit_record(&mut self) -> SplitResult<()> {
        let row = self
            .pending
            .take()
            .ok_or_else(|| SplitError::schema_mismatch("commit_record called outside a record"))?;
        self.writer_mut("commit a record on")?.write_record(&row)?;
        Ok(())
    }

    fn finish(&mut self) -> SplitResult<()> {
        self.pending = None;
        self.writer_mut("finish")?.flush()?;
        Ok(())
    }

    fn close(&mut self) -> SplitResult<()> {
        self.pending = None;
        if let Some(mut wtr) = self.writer.take() {
            wtr.flush()?;
        }
        Ok(())
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Utf8(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Float64(f) => f.to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
}
