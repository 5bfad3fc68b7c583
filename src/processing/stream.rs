//! Streaming record transformer.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{SplitError, SplitResult};
use crate::observability::{SkipEvent, SplitObserver, StreamStats, TracingObserver};
use crate::output::RecordSink;
use crate::planner::{OutputSlot, SplitPlan};
use crate::types::Value;

use super::coerce::{coerce_part, copy_pass_through};
use super::split::split_parts;

/// Lifecycle state of a [`SplitStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting `add` calls.
    Open,
    /// A fatal error occurred; only `close` is valid.
    Failed,
    /// `finish` succeeded; only `close` is valid.
    Finished,
    /// Resources released. Terminal.
    Closed,
}

impl StreamState {
    fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Failed => "failed",
            Self::Finished => "finished",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of transforming one input record.
enum RowOutcome {
    Emit(Vec<Value>),
    Skip(SkipEvent),
}

/// Applies a [`SplitPlan`] to a stream of records, writing results to a [`RecordSink`].
///
/// Records are processed strictly in input order, one `add` batch at a time. Each output record
/// is fully assembled before the sink sees any of it, so a failing record never leaves a
/// partial row downstream.
///
/// Call [`SplitStream::finish`] at end of input, then [`SplitStream::close`]. `close` is also
/// valid after a failure, and runs automatically on drop.
///
/// ```rust
/// use split_column::config::{OutputColumnConfig, SplitConfig};
/// use split_column::output::DataSetSink;
/// use split_column::planner::plan;
/// use split_column::processing::SplitStream;
/// use split_column::types::{DataType, Field, Schema, Value};
///
/// # fn main() -> Result<(), split_column::SplitError> {
/// let input = Schema::new(vec![
///     Field::new("id", DataType::Int64),
///     Field::new("pair", DataType::Utf8),
/// ]);
/// let config = SplitConfig::new(
///     "pair",
///     vec![
///         OutputColumnConfig::typed("key", DataType::Utf8),
///         OutputColumnConfig::typed("qty", DataType::Int64),
///     ],
/// )
/// .with_delimiter("=");
/// let plan = plan(&input, &config)?;
///
/// let mut sink = DataSetSink::new(plan.output_schema().clone());
/// let mut stream = SplitStream::new(&plan, &mut sink);
/// stream.add([vec![Value::Int64(1), Value::Utf8("apples=3".to_string())]])?;
/// stream.finish()?;
/// stream.close()?;
/// drop(stream);
///
/// assert_eq!(
///     sink.rows(),
///     &[vec![Value::Int64(1), Value::Utf8("apples".to_string()), Value::Int64(3)]]
/// );
/// # Ok(())
/// # }
/// ```
pub struct SplitStream<'p, S: RecordSink> {
    plan: &'p SplitPlan,
    sink: S,
    observer: Arc<dyn SplitObserver>,
    state: StreamState,
    stats: StreamStats,
}

impl<'p, S: RecordSink> SplitStream<'p, S> {
    /// Open a stream that reports diagnostics through [`TracingObserver`].
    pub fn new(plan: &'p SplitPlan, sink: S) -> Self {
        Self {
            plan,
            sink,
            observer: Arc::new(TracingObserver),
            state: StreamState::Open,
            stats: StreamStats::default(),
        }
    }

    /// Replace the diagnostics observer.
    pub fn with_observer(mut self, observer: Arc<dyn SplitObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Transform every record in `batch`, in order.
    ///
    /// Returns the number of records emitted from this batch. On a fatal error the stream moves
    /// to [`StreamState::Failed`]; records committed before the failing one stay committed.
    ///
    /// # Errors
    ///
    /// - [`SplitError::SplitValidation`] on a part-count mismatch when skipping is disabled
    /// - [`SplitError::TypeCoercion`] when a part cannot be parsed into its declared type
    /// - [`SplitError::SchemaMismatch`] when a record does not match the input schema
    /// - [`SplitError::InvalidState`] when the stream is not open
    /// - any error reported by the sink
    pub fn add<I, R>(&mut self, batch: I) -> SplitResult<usize>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[Value]>,
    {
        self.ensure_open("add records to")?;
        let mut emitted = 0usize;
        for record in batch {
            self.stats.rows_read += 1;
            let row = self.stats.rows_read;
            let outcome = transform_record(self.plan, row, record.as_ref())
                .and_then(|outcome| match outcome {
                    RowOutcome::Emit(values) => self.emit(values).map(|()| true),
                    RowOutcome::Skip(event) => {
                        self.observer.on_skip(&event);
                        Ok(false)
                    }
                });
            match outcome {
                Ok(true) => {
                    self.stats.rows_emitted += 1;
                    emitted += 1;
                }
                Ok(false) => self.stats.rows_skipped += 1,
                Err(err) => return Err(self.fail(err)),
            }
        }
        Ok(emitted)
    }

    /// Mark end of input and flush the sink.
    pub fn finish(&mut self) -> SplitResult<StreamStats> {
        self.ensure_open("finish")?;
        if let Err(err) = self.sink.finish() {
            return Err(self.fail(err));
        }
        self.state = StreamState::Finished;
        self.observer.on_finish(&self.stats);
        debug!(stats = %self.stats, "split stream finished");
        Ok(self.stats)
    }

    /// Release the sink. Valid from every state; later calls are no-ops.
    pub fn close(&mut self) -> SplitResult<()> {
        if self.state == StreamState::Closed {
            return Ok(());
        }
        let previous = self.state;
        self.state = StreamState::Closed;
        debug!(from = %previous, "closing split stream");
        self.sink.close()
    }

    fn ensure_open(&self, operation: &'static str) -> SplitResult<()> {
        match self.state {
            StreamState::Open => Ok(()),
            other => Err(SplitError::InvalidState {
                state: other.name(),
                operation,
            }),
        }
    }

    fn emit(&mut self, values: Vec<Value>) -> SplitResult<()> {
        self.sink.begin_record()?;
        for (position, value) in values.into_iter().enumerate() {
            match value {
                Value::Null => self.sink.set_null(position)?,
                value => self.sink.set_value(position, value)?,
            }
        }
        self.sink.commit_record()
    }

    fn fail(&mut self, err: SplitError) -> SplitError {
        self.state = StreamState::Failed;
        self.observer.on_failure(&err);
        err
    }
}

impl<S: RecordSink> Drop for SplitStream<'_, S> {
    fn drop(&mut self) {
        if self.state != StreamState::Closed {
            let _ = self.close();
        }
    }
}

impl<S: RecordSink> fmt::Debug for SplitStream<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitStream")
            .field("target", &self.plan.target_name())
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Split, validate and coerce one record, producing the full output row or a skip.
fn transform_record(plan: &SplitPlan, row: u64, record: &[Value]) -> SplitResult<RowOutcome> {
    let input = plan.input_schema();
    if record.len() != input.len() {
        return Err(SplitError::schema_mismatch(format!(
            "row {row} has {} values but the input schema has {} fields",
            record.len(),
            input.len()
        )));
    }

    let raw = match &record[plan.target_index()] {
        Value::Null => None,
        Value::Utf8(s) => Some(s.as_str()),
        other => {
            return Err(SplitError::schema_mismatch(format!(
                "row {row}: target field '{}' holds a {} value, expected string",
                plan.target_name(),
                other.kind()
            )));
        }
    };

    let parts = split_parts(raw, plan.delimiter());
    let expected = plan.parts().len();
    if parts.len() != expected {
        if plan.skip_on_mismatch() {
            return Ok(RowOutcome::Skip(SkipEvent {
                row,
                expected,
                actual: parts.len(),
                raw: raw.map(str::to_owned),
            }));
        }
        return Err(SplitError::SplitValidation {
            row,
            expected,
            actual: parts.len(),
            raw: raw.map(str::to_owned),
        });
    }

    let mut out = Vec::with_capacity(plan.slots().len());
    for slot in plan.slots() {
        let value = match *slot {
            OutputSlot::SplitPart { part_index } => {
                let spec = &plan.parts()[part_index];
                let part = parts[part_index];
                coerce_part(spec, part).map_err(|message| SplitError::TypeCoercion {
                    row,
                    column: spec.name.clone(),
                    part_index,
                    data_type: spec.data_type,
                    raw: part.to_owned(),
                    message,
                })?
            }
            OutputSlot::PassThrough { input_index } => {
                let field = &input.fields[input_index];
                copy_pass_through(field.data_type, &record[input_index]).map_err(|kind| {
                    SplitError::schema_mismatch(format!(
                        "row {row}: field '{}' is declared {} but holds a {kind} value",
                        field.name, field.data_type
                    ))
                })?
            }
        };
        out.push(value);
    }
    Ok(RowOutcome::Emit(out))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{SplitStream, StreamState};
    use crate::config::{OutputColumnConfig, SplitConfig};
    use crate::observability::{SkipEvent, SplitObserver};
    use crate::output::{DataSetSink, RecordSink};
    use crate::planner::{plan, SplitPlan};
    use crate::types::{DataType, Field, Schema, Value};
    use crate::{SplitError, SplitResult};

    #[derive(Default)]
    struct RecordingObserver {
        skips: Mutex<Vec<SkipEvent>>,
        failures: Mutex<Vec<String>>,
    }

    impl SplitObserver for RecordingObserver {
        fn on_skip(&self, event: &SkipEvent) {
            self.skips.lock().unwrap().push(event.clone());
        }

        fn on_failure(&self, err: &SplitError) {
            self.failures.lock().unwrap().push(err.to_string());
        }
    }

    fn two_part_plan(skip: bool) -> SplitPlan {
        let input = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("kv", DataType::Utf8),
        ]);
        let config = SplitConfig::new(
            "kv",
            vec![
                OutputColumnConfig::typed("k", DataType::Utf8),
                OutputColumnConfig::typed("v", DataType::Int64),
            ],
        )
        .with_skip_on_mismatch(skip);
        plan(&input, &config).unwrap()
    }

    fn rec(id: i64, kv: &str) -> Vec<Value> {
        vec![Value::Int64(id), Value::Utf8(kv.to_string())]
    }

    #[test]
    fn row_counter_spans_batches() {
        let plan = two_part_plan(true);
        let obs = Arc::new(RecordingObserver::default());
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        let mut stream = SplitStream::new(&plan, &mut sink).with_observer(obs.clone());

        assert_eq!(stream.add([rec(1, "a,1"), rec(2, "bad")]).unwrap(), 1);
        assert_eq!(stream.add([rec(3, "c,3"), rec(4, "x,y,z")]).unwrap(), 1);
        let stats = stream.finish().unwrap();

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_emitted, 2);
        assert_eq!(stats.rows_skipped, 2);
        let rows: Vec<u64> = obs.skips.lock().unwrap().iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn failed_stream_rejects_further_adds_but_closes() {
        let plan = two_part_plan(false);
        let obs = Arc::new(RecordingObserver::default());
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        {
            let mut stream = SplitStream::new(&plan, &mut sink).with_observer(obs.clone());
            let err = stream.add([rec(1, "a,1"), rec(2, "b"), rec(3, "c,3")]).unwrap_err();
            assert!(matches!(err, SplitError::SplitValidation { row: 2, expected: 2, actual: 1, .. }));
            assert_eq!(stream.state(), StreamState::Failed);

            let again = stream.add([rec(4, "d,4")]).unwrap_err();
            assert!(matches!(again, SplitError::InvalidState { state: "failed", .. }));
            assert!(stream.finish().is_err());

            stream.close().unwrap();
            stream.close().unwrap();
            assert_eq!(stream.state(), StreamState::Closed);
        }

        assert_eq!(obs.failures.lock().unwrap().len(), 1);
        assert!(sink.is_closed());
        assert!(!sink.is_finished());
        assert_eq!(sink.rows().len(), 1);
    }

    #[test]
    fn drop_closes_the_sink() {
        let plan = two_part_plan(true);
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        {
            let mut stream = SplitStream::new(&plan, &mut sink);
            stream.add([rec(1, "a,1")]).unwrap();
        }
        assert!(sink.is_closed());
        assert!(!sink.is_finished());
    }

    #[test]
    fn finish_then_close_then_add_is_invalid() {
        let plan = two_part_plan(true);
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        let mut stream = SplitStream::new(&plan, &mut sink);
        stream.finish().unwrap();
        assert_eq!(stream.state(), StreamState::Finished);
        assert!(matches!(
            stream.add([rec(1, "a,1")]).unwrap_err(),
            SplitError::InvalidState { state: "finished", .. }
        ));
        stream.close().unwrap();
        assert!(matches!(
            stream.finish().unwrap_err(),
            SplitError::InvalidState { state: "closed", .. }
        ));
    }

    #[test]
    fn wrong_record_width_is_schema_mismatch() {
        let plan = two_part_plan(true);
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        let mut stream = SplitStream::new(&plan, &mut sink);
        let err = stream.add([vec![Value::Int64(1)]]).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 values but the input schema has 2 fields"));
    }

    #[test]
    fn non_string_target_value_is_schema_mismatch() {
        let plan = two_part_plan(true);
        let mut sink = DataSetSink::new(plan.output_schema().clone());
        let mut stream = SplitStream::new(&plan, &mut sink);
        let err = stream.add([vec![Value::Int64(1), Value::Int64(2)]]).unwrap_err();
        assert!(err.to_string().contains("target field 'kv' holds a long value"));
    }

    /// Fails on the Nth `set_value`, to check nothing half-written is committed.
    struct FlakySink {
        inner: DataSetSink,
        fail_at: usize,
        sets: usize,
    }

    impl RecordSink for FlakySink {
        fn begin_record(&mut self) -> SplitResult<()> {
            self.inner.begin_record()
        }

        fn set_value(&mut self, position: usize, value: Value) -> SplitResult<()> {
            self.sets += 1;
            if self.sets == self.fail_at {
                return Err(SplitError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set_value(position, value)
        }

        fn commit_record(&mut self) -> SplitResult<()> {
            self.inner.commit_record()
        }

        fn finish(&mut self) -> SplitResult<()> {
            self.inner.finish()
        }

        fn close(&mut self) -> SplitResult<()> {
            self.inner.close()
        }
    }

    #[test]
    fn sink_error_mid_record_commits_nothing() {
        let plan = two_part_plan(true);
        let mut sink = FlakySink {
            inner: DataSetSink::new(plan.output_schema().clone()),
            fail_at: 5,
            sets: 0,
        };
        {
            let mut stream = SplitStream::new(&plan, &mut sink);
            let err = stream.add([rec(1, "a,1"), rec(2, "b,2")]).unwrap_err();
            assert!(matches!(err, SplitError::Io(_)));
        }
        assert_eq!(sink.inner.rows().len(), 1);
        assert!(sink.inner.is_closed());
    }
}
