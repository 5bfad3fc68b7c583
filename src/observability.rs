//! Diagnostics for split streams.
//!
//! A [`crate::processing::SplitStream`] reports skipped records, end-of-stream stats and fatal
//! errors to a [`SplitObserver`]. The default observer is [`TracingObserver`].

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info, warn};

use crate::error::{display_raw, SplitError};

/// A record dropped under the skip-on-mismatch policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEvent {
    /// 1-based position of the record within the stream.
    pub row: u64,
    /// Configured number of output columns.
    pub expected: usize,
    /// Number of parts the value actually split into.
    pub actual: usize,
    /// The offending target value (`None` when the target was null).
    pub raw: Option<String>,
}

impl fmt::Display for SkipEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipped row {}: expected {} parts but value was separated into {}: {}",
            self.row,
            self.expected,
            self.actual,
            display_raw(&self.raw)
        )
    }
}

/// Counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Records received through `add`.
    pub rows_read: u64,
    /// Records committed to the sink.
    pub rows_emitted: u64,
    /// Records dropped under the skip-on-mismatch policy.
    pub rows_skipped: u64,
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows_read={}, rows_emitted={}, rows_skipped={}",
            self.rows_read, self.rows_emitted, self.rows_skipped
        )
    }
}

/// Observer interface for stream diagnostics.
pub trait SplitObserver: Send + Sync {
    /// Called when a record is skipped because its part count did not match.
    fn on_skip(&self, _event: &SkipEvent) {}

    /// Called once when the stream finishes successfully.
    fn on_finish(&self, _stats: &StreamStats) {}

    /// Called when the stream aborts with a fatal error.
    fn on_failure(&self, _error: &SplitError) {}
}

/// Routes diagnostics to `tracing`: skips at `warn`, completion at `info`, failures at `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SplitObserver for TracingObserver {
    fn on_skip(&self, event: &SkipEvent) {
        warn!(
            row = event.row,
            expected = event.expected,
            actual = event.actual,
            raw = %display_raw(&event.raw),
            "skipped record with unexpected part count"
        );
    }

    fn on_finish(&self, stats: &StreamStats) {
        info!(
            rows_read = stats.rows_read,
            rows_emitted = stats.rows_emitted,
            rows_skipped = stats.rows_skipped,
            "split stream finished"
        );
    }

    fn on_failure(&self, err: &SplitError) {
        error!(error = %err, "split stream failed");
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn SplitObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn SplitObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl SplitObserver for CompositeObserver {
    fn on_skip(&self, event: &SkipEvent) {
        for o in &self.observers {
            o.on_skip(event);
        }
    }

    fn on_finish(&self, stats: &StreamStats) {
        for o in &self.observers {
            o.on_finish(stats);
        }
    }

    fn on_failure(&self, err: &SplitError) {
        for o in &self.observers {
            o.on_failure(err);
        }
    }
}

/// Appends stream events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl SplitObserver for FileObserver {
    fn on_skip(&self, event: &SkipEvent) {
        self.append_line(&format!("{} skip {event}", unix_ts()));
    }

    fn on_finish(&self, stats: &StreamStats) {
        self.append_line(&format!("{} finish {stats}", unix_ts()));
    }

    fn on_failure(&self, err: &SplitError) {
        self.append_line(&format!("{} fail err={err}", unix_ts()));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
