//! Pending handle returned by `AnalysisRunner::run`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use super::events::RunId;
use crate::error::{Result, WorkflowError};

/// Handle to an in-flight run.
///
/// Awaiting it yields the run's outcome. Dropping it does not stop the run;
/// the result still lands in the workflow state. Use the workflow's
/// `cancel()` to stop a run.
#[derive(Debug)]
pub struct RunHandle<T> {
    run: RunId,
    task: JoinHandle<Result<T>>,
}

impl<T> RunHandle<T> {
    pub(crate) fn new(run: RunId, task: JoinHandle<Result<T>>) -> Self {
        Self { run, task }
    }

    pub fn id(&self) -> RunId {
        self.run
    }

    /// True once the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for RunHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(outcome) => outcome,
            // Only happens when the runtime shuts down under the task.
            Err(_) => Err(WorkflowError::Cancelled),
        })
    }
}
