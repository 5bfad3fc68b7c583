//! One-shot split of an in-memory [`DataSet`].

use std::sync::Arc;

use crate::error::{SplitError, SplitResult};
use crate::observability::SplitObserver;
use crate::output::DataSetSink;
use crate::planner::SplitPlan;
use crate::types::DataSet;

use super::stream::SplitStream;

/// Apply `plan` to every row of `dataset`, returning a dataset shaped like the plan's output
/// schema. Skips are reported through the default [`crate::observability::TracingObserver`].
pub fn split_dataset(dataset: &DataSet, plan: &SplitPlan) -> SplitResult<DataSet> {
    run(dataset, plan, None)
}

/// Like [`split_dataset`], reporting diagnostics to `observer`.
pub fn split_dataset_with_observer(
    dataset: &DataSet,
    plan: &SplitPlan,
    observer: Arc<dyn SplitObserver>,
) -> SplitResult<DataSet> {
    run(dataset, plan, Some(observer))
}

fn run(
    dataset: &DataSet,
    plan: &SplitPlan,
    observer: Option<Arc<dyn SplitObserver>>,
) -> SplitResult<DataSet> {
    if dataset.schema != *plan.input_schema() {
        return Err(SplitError::schema_mismatch(format!(
            "dataset fields {:?} do not match the planned input fields {:?}",
            dataset.schema.field_names().collect::<Vec<_>>(),
            plan.input_schema().field_names().collect::<Vec<_>>()
        )));
    }

    let mut sink = DataSetSink::new(plan.output_schema().clone());
    {
        let mut stream = SplitStream::new(plan, &mut sink);
        if let Some(observer) = observer {
            stream = stream.with_observer(observer);
        }
        stream.add(&dataset.rows)?;
        stream.finish()?;
        stream.close()?;
    }
    Ok(sink.into_dataset())
}
