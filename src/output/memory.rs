//! In-memory sink collecting records into a [`DataSet`].

use crate::error::{SplitError, SplitResult};
use crate::types::{DataSet, Schema, Value};

use super::RecordSink;

/// Collects committed records into a [`DataSet`] with the given schema.
#[derive(Debug, Clone)]
pub struct DataSetSink {
    dataset: DataSet,
    pending: Option<Vec<Value>>,
    finished: bool,
    closed: bool,
}

impl DataSetSink {
    /// Create an empty sink for records shaped like `schema`.
    pub fn new(schema: Schema) -> Self {
        Self {
            dataset: DataSet::empty(schema),
            pending: None,
            finished: false,
            closed: false,
        }
    }

    /// Records committed so far.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.dataset.rows
    }

    /// Whether `finish` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Consume the sink, returning the collected records.
    pub fn into_dataset(self) -> DataSet {
        self.dataset
    }

    fn ensure_open(&self, operation: &'static str) -> SplitResult<()> {
        if self.closed {
            return Err(SplitError::InvalidState {
                state: "closed",
                operation,
            });
        }
        Ok(())
    }
}

impl RecordSink for DataSetSink {
    fn begin_record(&mut self) -> SplitResult<()> {
        self.ensure_open("begin a record on")?;
        self.pending = Some(vec![Value::Null; self.dataset.schema.len()]);
        Ok(())
    }

    fn set_value(&mut self, position: usize, value: Value) -> SplitResult<()> {
        let width = self.dataset.schema.len();
        let row = self
            .pending
            .as_mut()
            .ok_or_else(|| SplitError::schema_mismatch("set_value called outside a record"))?;
        let slot = row.get_mut(position).ok_or_else(|| {
            SplitError::schema_mismatch(format!(
                "position {position} is out of range for a record of {width} fields"
            ))
        })?;
        *slot = value;
        Ok(())
    }

    fn commit_record(&mut self) -> SplitResult<()> {
        self.ensure_open("commit a record on")?;
        let row = self
            .pending
            .take()
            .ok_or_else(|| SplitError::schema_mismatch("commit_record called outside a record"))?;
        self.dataset.rows.push(row);
        Ok(())
    }

    fn finish(&mut self) -> SplitResult<()> {
        self.ensure_open("finish")?;
        self.pending = None;
        self.finished = true;
        Ok(())
    }

    fn close(&mut self) -> SplitResult<()> {
        self.pending = None;
        self.closed = true;
        Ok(())
    }
}
