//! File-to-file runs: read a CSV, split one column, write a CSV.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info_span};

use crate::config::JobConfig;
use crate::error::SplitResult;
use crate::ingestion::CsvRecords;
use crate::observability::{SplitObserver, StreamStats, TracingObserver};
use crate::output::CsvSink;
use crate::planner::plan;
use crate::processing::SplitStream;

/// Run `job` over the CSV at `input`, writing CSV to `output` (or stdout when `None`).
///
/// Records are read and transformed `job.batch_size` at a time; memory use does not grow with
/// the input size.
pub fn run_job(job: &JobConfig, input: &Path, output: Option<&Path>) -> SplitResult<StreamStats> {
    run_job_with_observer(job, input, output, Arc::new(TracingObserver))
}

/// Like [`run_job`], reporting diagnostics to `observer`.
pub fn run_job_with_observer(
    job: &JobConfig,
    input: &Path,
    output: Option<&Path>,
    observer: Arc<dyn SplitObserver>,
) -> SplitResult<StreamStats> {
    let _span = info_span!("split_job", input = %input.display()).entered();

    let input_schema = job.input_schema()?;
    let plan = plan(&input_schema, &job.split)?;
    let mut records = CsvRecords::from_path(input, plan.input_schema())?;

    match output {
        Some(path) => {
            let sink = CsvSink::from_path(path, plan.output_schema())?;
            drive(&mut records, SplitStream::new(&plan, sink).with_observer(observer), job.batch_size)
        }
        None => {
            let sink = CsvSink::from_writer(io::stdout().lock(), plan.output_schema())?;
            drive(&mut records, SplitStream::new(&plan, sink).with_observer(observer), job.batch_size)
        }
    }
}

fn drive<R, W>(
    records: &mut CsvRecords<R>,
    mut stream: SplitStream<'_, CsvSink<W>>,
    batch_size: usize,
) -> SplitResult<StreamStats>
where
    R: io::Read,
    W: Write,
{
    loop {
        let batch = records.next_batch(batch_size)?;
        if batch.is_empty() {
            break;
        }
        let emitted = stream.add(&batch)?;
        debug!(read = batch.len(), emitted, "processed batch");
    }
    let stats = stream.finish()?;
    stream.close()?;
    Ok(stats)
}
