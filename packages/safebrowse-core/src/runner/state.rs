//! Observable workflow state.

use std::fmt;

use serde::Serialize;

use crate::error::{AnalysisError, WorkflowError};

/// Lifecycle of one workflow's analysis.
///
/// Exactly one instance exists per workflow. Only the runner's transitions
/// mutate it; everyone else observes clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AnalysisState<T> {
    /// Nothing has run yet.
    Idle,
    /// A run is in flight; the value is the latest accepted progress (0..=100).
    Running(u8),
    /// The last run succeeded.
    Completed(T),
    /// The last run failed. No partial result is kept.
    Failed(FailureReason),
}

impl<T> AnalysisState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// `Completed` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Progress as shown to the user. Completed runs always read 100.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Running(p) => Some(*p),
            Self::Completed(_) => Some(100),
            Self::Idle | Self::Failed(_) => None,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running(_) => "running",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

impl<T> Default for AnalysisState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// `cancel()` was called while the run was in flight.
    Cancelled,
    /// The capability returned an error or panicked.
    Analysis(#[serde(serialize_with = "serialize_display")] AnalysisError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("analysis cancelled"),
            Self::Analysis(e) => write!(f, "{e}"),
        }
    }
}

impl From<FailureReason> for WorkflowError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::Cancelled => WorkflowError::Cancelled,
            FailureReason::Analysis(e) => WorkflowError::Analysis(e),
        }
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &AnalysisError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
