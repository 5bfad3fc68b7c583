use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use split_column::config::JobConfig;
use split_column::job::{run_job, run_job_with_observer};
use split_column::observability::{SkipEvent, SplitObserver, StreamStats};
use split_column::SplitError;

fn tmp_file(stem: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("split-column-{stem}-{nanos}.{ext}"))
}

fn orders_job() -> JobConfig {
    JobConfig::from_path("tests/fixtures/orders_job.json").unwrap()
}

#[derive(Default)]
struct SkipLog(Mutex<Vec<SkipEvent>>);

impl SplitObserver for SkipLog {
    fn on_skip(&self, event: &SkipEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn orders_job_splits_and_skips() {
    let out = tmp_file("orders", "csv");
    let skips = Arc::new(SkipLog::default());

    let stats = run_job_with_observer(
        &orders_job(),
        Path::new("tests/fixtures/orders.csv"),
        Some(&out),
        skips.clone(),
    )
    .unwrap();

    assert_eq!(
        stats,
        StreamStats {
            rows_read: 5,
            rows_emitted: 3,
            rows_skipped: 2,
        }
    );

    let events = skips.0.lock().unwrap().clone();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].row, events[0].actual), (3, 2));
    assert_eq!(events[0].raw.as_deref(), Some("broken|line"));
    // An empty cell is read as null, which splits into zero parts.
    assert_eq!((events[1].row, events[1].actual, events[1].raw.clone()), (4, 0, None));

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "order_id,item,qty,price,gift,ship_on,placed_at,note",
            "1,widget,3,9.99,true,2024-01-05T00:00:00Z,2024-01-05T10:00:00Z,first",
            "2,gadget,1,24.5,false,2024-01-06T00:00:00Z,2024-01-06T11:30:00Z,",
            "5,bolt,12,0.25,false,2024-01-09T00:00:00Z,,no timestamp",
        ]
    );
    let _ = std::fs::remove_file(out);
}

#[test]
fn orders_job_fails_on_mismatch_when_not_skipping() {
    let out = tmp_file("orders-strict", "csv");
    let mut job = orders_job();
    job.split.skip_on_mismatch = false;

    let err = run_job(&job, Path::new("tests/fixtures/orders.csv"), Some(&out)).unwrap_err();
    match err {
        SplitError::SplitValidation {
            row,
            expected,
            actual,
            raw,
        } => {
            assert_eq!((row, expected, actual), (3, 5, 2));
            assert_eq!(raw.as_deref(), Some("broken|line"));
        }
        other => panic!("expected split validation error, got {other:?}"),
    }

    // Records before the failing one were committed and flushed on close.
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 3);
    let _ = std::fs::remove_file(out);
}

#[test]
fn unparsable_part_aborts_the_job() {
    let input = tmp_file("bad-qty", "csv");
    let out = tmp_file("bad-qty-out", "csv");
    std::fs::write(
        &input,
        "order_id,line,placed_at,note\n1,nut|many|0.1|true|2024-02-01,,\n",
    )
    .unwrap();

    let err = run_job(&orders_job(), &input, Some(&out)).unwrap_err();
    assert!(matches!(
        err,
        SplitError::TypeCoercion { row: 1, part_index: 1, ref column, .. } if column == "qty"
    ));
    let _ = std::fs::remove_file(input);
    let _ = std::fs::remove_file(out);
}

#[test]
fn unknown_target_is_a_config_error() {
    let mut job = orders_job();
    job.split.target_key = "missing".to_string();
    let out = tmp_file("no-target", "csv");

    let err = run_job(&job, Path::new("tests/fixtures/orders.csv"), Some(&out)).unwrap_err();
    assert!(matches!(err, SplitError::Config { .. }));
    assert!(!out.exists());
}

#[test]
fn job_config_rejects_zero_batch_size() {
    let text = std::fs::read_to_string("tests/fixtures/orders_job.json")
        .unwrap()
        .replace("\"batch_size\": 2", "\"batch_size\": 0");
    assert!(matches!(JobConfig::from_json_str(&text), Err(SplitError::Config { .. })));
}
