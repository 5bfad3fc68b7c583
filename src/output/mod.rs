//! Downstream record sinks.
//!
//! A [`RecordSink`] receives assembled output records one field at a time, bracketed by
//! [`RecordSink::begin_record`] and [`RecordSink::commit_record`], and is shut down with
//! [`RecordSink::finish`] (end of stream) followed by [`RecordSink::close`] (release resources).
//!
//! Implementations:
//!
//! - [`DataSetSink`]: collects records into an in-memory [`crate::types::DataSet`]
//! - [`CsvSink`]: writes a headered CSV stream

pub mod csv;
pub mod memory;

use crate::error::SplitResult;
use crate::types::Value;

pub use self::csv::CsvSink;
pub use self::memory::DataSetSink;

/// Receiver of assembled output records.
///
/// Values set between `begin_record` and `commit_record` must not become visible downstream
/// until the commit.
pub trait RecordSink {
    /// Start a new record. Any uncommitted record is discarded.
    fn begin_record(&mut self) -> SplitResult<()>;

    /// Set the field at `position` of the current record.
    fn set_value(&mut self, position: usize, value: Value) -> SplitResult<()>;

    /// Set the field at `position` of the current record to null.
    fn set_null(&mut self, position: usize) -> SplitResult<()> {
        self.set_value(position, Value::Null)
    }

    /// Publish the current record.
    fn commit_record(&mut self) -> SplitResult<()>;

    /// Signal that no more records will be committed; flush buffered output.
    fn finish(&mut self) -> SplitResult<()>;

    /// Release the underlying resources. Must be safe to call more than once.
    fn close(&mut self) -> SplitResult<()>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn begin_record(&mut self) -> SplitResult<()> {
        (**self).begin_record()
    }

    fn set_value(&mut self, position: usize, value: Value) -> SplitResult<()> {
        (**self).set_value(position, value)
    }

    fn set_null(&mut self, position: usize) -> SplitResult<()> {
        (**self).set_null(position)
    }

    fn commit_record(&mut self) -> SplitResult<()> {
        (**self).commit_record()
    }

    fn finish(&mut self) -> SplitResult<()> {
        (**self).finish()
    }

    fn close(&mut self) -> SplitResult<()> {
        (**self).close()
    }
}
