//! Shared analysis runner.
//!
//! `AnalysisRunner` is the state machine both workflows are built on:
//!
//! ```text
//! Idle ──run──► Running(0) ──progress──► Running(p) ──► Completed(result)
//!   ▲               │                        │      └──► Failed(reason)
//!   │               └──────── cancel ────────┴─────────► Failed(Cancelled)
//!   └─ (Completed | Failed) ──run──► Running(0)
//! ```
//!
//! # Guarantees
//!
//! - Validation happens before any transition; rejected input leaves the
//!   state untouched.
//! - At most one run is in flight. `run` while `Running` fails with
//!   `AlreadyRunning` and does not disturb the in-flight run.
//! - Progress never decreases within a run.
//! - Progress, completion, failure and cancellation are applied under the
//!   watch channel's lock, so once a run is terminal no late update from it
//!   can land. Updates tagged with an older `RunId` are dropped too.
//! - A panicking capability ends in `Failed`, never a stuck `Running`.

mod events;
mod handle;
mod progress;
mod state;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub use events::{RunId, RunnerEvent, RunnerEventKind};
pub use handle::RunHandle;
pub use progress::ProgressReporter;
pub use state::{AnalysisState, FailureReason};

use crate::error::{AnalysisError, AnalysisResult, Result, WorkflowError};
use crate::types::request::Validate;
use progress::ProgressSink;

/// Buffered events per runner before slow subscribers start lagging.
const EVENT_CAPACITY: usize = 256;

/// What the watch channel holds. Observers only see `state`.
struct Slot<T> {
    run: Option<RunId>,
    state: AnalysisState<T>,
    cancel: Option<CancellationToken>,
}

struct Shared<T> {
    name: &'static str,
    slot: watch::Sender<Slot<T>>,
    events: broadcast::Sender<RunnerEvent>,
    next_run: AtomicU64,
}

/// Runs one analysis at a time and publishes its state.
///
/// Cloning yields another handle to the same runner.
pub struct AnalysisRunner<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AnalysisRunner<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> AnalysisRunner<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle runner. `name` tags log lines.
    pub fn new(name: &'static str) -> Self {
        let (slot, _) = watch::channel(Slot {
            run: None,
            state: AnalysisState::Idle,
            cancel: None,
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            shared: Arc::new(Shared {
                name,
                slot,
                events,
                next_run: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AnalysisState<T> {
        self.shared.slot.borrow().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.slot.borrow().state.is_running()
    }

    /// The most recent run, if any has started.
    pub fn current_run(&self) -> Option<RunId> {
        self.shared.slot.borrow().run
    }

    /// Observe state changes.
    pub fn watch(&self) -> StateWatcher<T> {
        StateWatcher {
            rx: self.shared.slot.subscribe(),
        }
    }

    /// Subscribe to every accepted transition from now on.
    pub fn events(&self) -> broadcast::Receiver<RunnerEvent> {
        self.shared.events.subscribe()
    }

    /// Validate `input` and, if accepted, start `capability` on the runtime.
    ///
    /// Returns immediately. Must be called from within a tokio runtime.
    pub fn run<I, F, Fut>(&self, input: I, capability: F) -> Result<RunHandle<T>>
    where
        I: Validate + Send + 'static,
        F: FnOnce(I, ProgressReporter) -> Fut + Send + 'static,
        Fut: Future<Output = AnalysisResult<T>> + Send + 'static,
    {
        let validation = input.validate();
        let (run, cancel) = self.shared.begin(validation)?;

        info!(workflow = self.shared.name, run = %run, "analysis started");

        let reporter = ProgressReporter::new(
            Arc::clone(&self.shared) as Arc<dyn ProgressSink>,
            run,
            cancel.clone(),
        );
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            let work = AssertUnwindSafe(async move { capability(input, reporter).await })
                .catch_unwind();

            let outcome = tokio::select! {
                biased;
                // cancel() already moved the state to Failed(Cancelled).
                _ = cancel.cancelled() => return Err(WorkflowError::Cancelled),
                result = work => match result {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(AnalysisError::Panicked(panic_message(&panic))),
                },
            };

            shared.finish(run, outcome)
        });

        Ok(RunHandle::new(run, task))
    }

    /// Cancel the in-flight run.
    ///
    /// Moves `Running` to `Failed(Cancelled)` and signals the capability.
    /// Returns false if nothing was running.
    pub fn cancel(&self) -> bool {
        let mut cancelled = None;
        self.shared.slot.send_if_modified(|slot| {
            let Some(run) = slot.run.filter(|_| slot.state.is_running()) else {
                return false;
            };
            slot.state = AnalysisState::Failed(FailureReason::Cancelled);
            if let Some(token) = slot.cancel.take() {
                token.cancel();
            }
            let _ = self.shared.events.send(RunnerEvent::now(
                run,
                RunnerEventKind::Failed {
                    reason: FailureReason::Cancelled,
                },
            ));
            cancelled = Some(run);
            true
        });

        match cancelled {
            Some(run) => {
                info!(workflow = self.shared.name, run = %run, "analysis cancelled");
                true
            }
            None => false,
        }
    }
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Enter `Running(0)` unless a run is in flight or validation failed.
    fn begin(&self, validation: Result<()>) -> Result<(RunId, CancellationToken)> {
        let mut started = Err(WorkflowError::AlreadyRunning);

        self.slot.send_if_modified(|slot| {
            if slot.state.is_running() {
                return false;
            }
            if let Err(e) = &validation {
                started = Err(e.clone());
                return false;
            }

            let run = RunId(self.next_run.fetch_add(1, Ordering::Relaxed) + 1);
            let cancel = CancellationToken::new();
            slot.run = Some(run);
            slot.state = AnalysisState::Running(0);
            slot.cancel = Some(cancel.clone());
            let _ = self
                .events
                .send(RunnerEvent::now(run, RunnerEventKind::Started));

            started = Ok((run, cancel));
            true
        });

        if let Err(e) = &started {
            debug!(workflow = self.name, error = %e, "run rejected");
        }
        started
    }

    /// Apply the capability's outcome if the run is still the live one.
    fn finish(&self, run: RunId, outcome: AnalysisResult<T>) -> Result<T> {
        let mut applied = false;

        self.slot.send_if_modified(|slot| {
            if slot.run != Some(run) || !slot.state.is_running() {
                return false;
            }

            let kind = match &outcome {
                Ok(result) => {
                    slot.state = AnalysisState::Completed(result.clone());
                    RunnerEventKind::Completed
                }
                Err(e) => {
                    let reason = FailureReason::Analysis(e.clone());
                    slot.state = AnalysisState::Failed(reason.clone());
                    RunnerEventKind::Failed { reason }
                }
            };
            slot.cancel = None;
            let _ = self.events.send(RunnerEvent::now(run, kind));

            applied = true;
            true
        });

        if !applied {
            // Lost the race against cancel().
            trace!(workflow = self.name, run = %run, "outcome dropped after cancellation");
            return Err(WorkflowError::Cancelled);
        }

        match outcome {
            Ok(result) => {
                info!(workflow = self.name, run = %run, "analysis completed");
                Ok(result)
            }
            Err(e) => {
                warn!(workflow = self.name, run = %run, error = %e, "analysis failed");
                Err(WorkflowError::Analysis(e))
            }
        }
    }
}

/// Why a progress report was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ignored {
    /// From a run that is no longer current.
    Stale,
    /// The run already reached a terminal state.
    Late,
    /// Not greater than the current value.
    NotIncreasing,
}

impl<T> ProgressSink for Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn report(&self, run: RunId, percent: u8) -> bool {
        let mut outcome = Ok(());

        self.slot.send_if_modified(|slot| {
            if slot.run != Some(run) {
                outcome = Err(Ignored::Stale);
                return false;
            }
            match slot.state {
                AnalysisState::Running(current) if percent > current => {
                    slot.state = AnalysisState::Running(percent);
                    let _ = self
                        .events
                        .send(RunnerEvent::now(run, RunnerEventKind::Progress { percent }));
                    true
                }
                AnalysisState::Running(_) => {
                    outcome = Err(Ignored::NotIncreasing);
                    false
                }
                _ => {
                    outcome = Err(Ignored::Late);
                    false
                }
            }
        });

        match outcome {
            Ok(()) => {
                debug!(workflow = self.name, run = %run, progress = percent, "progress");
                true
            }
            Err(ignored) => {
                trace!(workflow = self.name, run = %run, progress = percent, ?ignored, "progress ignored");
                false
            }
        }
    }
}

/// Read-only view of a runner's state.
pub struct StateWatcher<T> {
    rx: watch::Receiver<Slot<T>>,
}

impl<T: Clone> StateWatcher<T> {
    /// The latest state, marking it seen.
    pub fn current(&mut self) -> AnalysisState<T> {
        self.rx.borrow_and_update().state.clone()
    }

    /// Wait for the next change and return the new state.
    ///
    /// Returns `None` once the runner is dropped.
    pub async fn changed(&mut self) -> Option<AnalysisState<T>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Wait until the state is `Completed` or `Failed`.
    pub async fn terminal(&mut self) -> Option<AnalysisState<T>> {
        let slot = self.rx.wait_for(|slot| slot.state.is_terminal()).await.ok()?;
        Some(slot.state.clone())
    }
}

impl<T> std::fmt::Debug for AnalysisRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.shared.slot.borrow();
        f.debug_struct("AnalysisRunner")
            .field("name", &self.shared.name)
            .field("run", &slot.run)
            .field("state", &slot.state.label())
            .finish()
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    struct Input(bool);

    impl Validate for Input {
        fn validate(&self) -> Result<()> {
            if self.0 {
                Ok(())
            } else {
                Err(WorkflowError::invalid_input("rejected by test"))
            }
        }
    }

    fn runner() -> AnalysisRunner<String> {
        AnalysisRunner::new("test")
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_state_idle() {
        let runner = runner();
        let err = runner
            .run(Input(false), |_, _| async { Ok("never".to_string()) })
            .unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidInput { .. }));
        assert!(runner.state().is_idle());
        assert_eq!(runner.current_run(), None);
    }

    #[tokio::test]
    async fn test_success_completes_with_full_progress() {
        let runner = runner();
        let handle = runner
            .run(Input(true), |_, progress| async move {
                progress.report(40);
                Ok("done".to_string())
            })
            .unwrap();

        assert_eq!(handle.await.unwrap(), "done");
        let state = runner.state();
        assert_eq!(state, AnalysisState::Completed("done".to_string()));
        assert_eq!(state.progress(), Some(100));
    }

    #[tokio::test]
    async fn test_run_enters_running_zero_synchronously() {
        let runner = runner();
        let (release, gate) = oneshot::channel::<()>();
        let handle = runner
            .run(Input(true), |_, _| async move {
                let _ = gate.await;
                Ok("ok".to_string())
            })
            .unwrap();

        assert_eq!(runner.state(), AnalysisState::Running(0));
        release.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_already_running_does_not_disturb_in_flight_run() {
        let runner = runner();
        let (release, gate) = oneshot::channel::<()>();
        let handle = runner
            .run(Input(true), |_, progress| async move {
                progress.report(30);
                let _ = gate.await;
                Ok("first".to_string())
            })
            .unwrap();
        let first = handle.id();

        tokio::task::yield_now().await;
        let err = runner
            .run(Input(true), |_, _| async { Ok("second".to_string()) })
            .unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyRunning);
        assert_eq!(runner.current_run(), Some(first));

        // Invalid input while running still reports AlreadyRunning.
        let err = runner
            .run(Input(false), |_, _| async { Ok("third".to_string()) })
            .unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyRunning);

        release.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), "first");
        assert_eq!(runner.state(), AnalysisState::Completed("first".to_string()));
    }

    #[tokio::test]
    async fn test_decreasing_progress_is_ignored() {
        let runner = runner();
        let (release, gate) = oneshot::channel::<()>();
        let (reported_tx, reported_rx) = oneshot::channel::<Vec<bool>>();
        let handle = runner
            .run(Input(true), |_, progress| async move {
                let accepted = vec![
                    progress.report(50),
                    progress.report(20),
                    progress.report(50),
                    progress.report(200),
                ];
                let _ = reported_tx.send(accepted);
                let _ = gate.await;
                Ok("ok".to_string())
            })
            .unwrap();

        let accepted = reported_rx.await.unwrap();
        assert_eq!(accepted, vec![true, false, false, true]);
        assert_eq!(runner.state(), AnalysisState::Running(100));

        release.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let runner = runner();
        let err = runner
            .run(Input(true), |_, _| async {
                Err(AnalysisError::Network("connection reset".into()))
            })
            .unwrap()
            .await
            .unwrap_err();

        assert_eq!(
            err,
            WorkflowError::Analysis(AnalysisError::Network("connection reset".into()))
        );
        assert!(matches!(
            runner.state(),
            AnalysisState::Failed(FailureReason::Analysis(_))
        ));

        let (release, gate) = oneshot::channel::<()>();
        let handle = runner
            .run(Input(true), |_, _| async move {
                let _ = gate.await;
                Ok("retry".to_string())
            })
            .unwrap();
        assert_eq!(runner.state(), AnalysisState::Running(0));

        release.send(()).unwrap();
        assert_eq!(handle.await.unwrap(), "retry");
    }

    #[tokio::test]
    async fn test_panicking_capability_fails_run() {
        let runner = runner();
        let err = runner
            .run(Input(true), |_, _| async {
                if true {
                    panic!("boom");
                }
                Ok("unreachable".to_string())
            })
            .unwrap()
            .await
            .unwrap_err();

        assert_eq!(
            err,
            WorkflowError::Analysis(AnalysisError::Panicked("boom".into()))
        );
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn test_cancel_fails_run_and_signals_capability() {
        let runner = runner();
        let (observed_tx, observed_rx) = oneshot::channel::<bool>();
        let handle = runner
            .run(Input(true), |_, progress| async move {
                progress.cancelled().await;
                let _ = observed_tx.send(progress.is_cancelled());
                Ok("late".to_string())
            })
            .unwrap();

        tokio::task::yield_now().await;
        assert!(runner.cancel());
        assert_eq!(
            runner.state(),
            AnalysisState::Failed(FailureReason::Cancelled)
        );
        assert_eq!(handle.await.unwrap_err(), WorkflowError::Cancelled);
        // The runner drops the capability future on cancel, so the sender
        // may be gone before it fires.
        if let Ok(seen) = observed_rx.await {
            assert!(seen);
        }
        assert!(!runner.cancel());
    }

    #[tokio::test]
    async fn test_late_progress_after_terminal_is_dropped() {
        let runner = runner();
        let (reporter_tx, reporter_rx) = oneshot::channel::<ProgressReporter>();
        runner
            .run(Input(true), |_, progress| async move {
                let _ = reporter_tx.send(progress.clone());
                Ok("done".to_string())
            })
            .unwrap()
            .await
            .unwrap();

        let leaked = reporter_rx.await.unwrap();
        assert!(!leaked.report(99));
        assert_eq!(runner.state(), AnalysisState::Completed("done".to_string()));
    }

    #[tokio::test]
    async fn test_stale_progress_from_previous_run_is_dropped() {
        let runner = runner();
        let (reporter_tx, reporter_rx) = oneshot::channel::<ProgressReporter>();
        runner
            .run(Input(true), |_, progress| async move {
                let _ = reporter_tx.send(progress.clone());
                Err(AnalysisError::Rejected("first".into()))
            })
            .unwrap()
            .await
            .unwrap_err();
        let stale = reporter_rx.await.unwrap();

        let (release, gate) = oneshot::channel::<()>();
        let handle = runner
            .run(Input(true), |_, _| async move {
                let _ = gate.await;
                Ok("second".to_string())
            })
            .unwrap();

        assert!(!stale.report(80));
        assert_eq!(runner.state(), AnalysisState::Running(0));

        release.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_events_follow_transitions() {
        let runner = runner();
        let mut events = runner.events();

        let handle = runner
            .run(Input(true), |_, progress| async move {
                progress.report(25);
                progress.report(75);
                Ok("ok".to_string())
            })
            .unwrap();
        let run = handle.id();
        handle.await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.run, run);
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                RunnerEventKind::Started,
                RunnerEventKind::Progress { percent: 25 },
                RunnerEventKind::Progress { percent: 75 },
                RunnerEventKind::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_watcher_sees_terminal_state() {
        let runner = runner();
        let mut watcher = runner.watch();
        assert!(watcher.current().is_idle());

        runner
            .run(Input(true), |_, _| async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok("watched".to_string())
            })
            .unwrap();

        let state = watcher.terminal().await.unwrap();
        assert_eq!(state.result().map(String::as_str), Some("watched"));
    }
}
