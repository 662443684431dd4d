//! Progress callback handed to capabilities.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::events::RunId;

/// Receives progress reports for a specific run.
pub(crate) trait ProgressSink: Send + Sync {
    /// Returns true if the update was accepted.
    fn report(&self, run: RunId, percent: u8) -> bool;
}

struct DetachedSink;

impl ProgressSink for DetachedSink {
    fn report(&self, _run: RunId, _percent: u8) -> bool {
        false
    }
}

/// Callback a capability uses to report progress and observe cancellation.
///
/// Cheap to clone, so a capability can hand copies to concurrent sub-tasks.
/// Reports are percentages; values above 100 are clamped. The runner keeps
/// only increases, so a slow sub-task delivering an older value cannot
/// move the bar backwards. Reports arriving after the run ended are
/// dropped.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    run: RunId,
    cancel: CancellationToken,
}

impl ProgressReporter {
    pub(crate) fn new(sink: Arc<dyn ProgressSink>, run: RunId, cancel: CancellationToken) -> Self {
        Self { sink, run, cancel }
    }

    /// A reporter not attached to any runner. Every report is ignored.
    ///
    /// Useful when calling a capability directly.
    pub fn detached() -> Self {
        Self {
            sink: Arc::new(DetachedSink),
            run: RunId(0),
            cancel: CancellationToken::new(),
        }
    }

    /// Report progress. Returns false when the update was ignored
    /// (not an increase, run already finished, or run superseded).
    pub fn report(&self, percent: u8) -> bool {
        self.sink.report(self.run, percent.min(100))
    }

    /// The run this reporter belongs to.
    pub fn run_id(&self) -> RunId {
        self.run
    }

    /// True once the run was cancelled. Capabilities should stop early.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves when the run is cancelled. Use inside `tokio::select!`.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("run", &self.run)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_reporter_ignores_reports() {
        let reporter = ProgressReporter::detached();
        assert!(!reporter.report(10));
        assert!(!reporter.is_cancelled());
        assert_eq!(reporter.run_id().as_u64(), 0);
    }
}
