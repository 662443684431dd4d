//! Typed errors for the analysis workflows.
//!
//! Uses `thiserror` so callers can match on the exact failure kind.
//! Every error here is recoverable at the workflow boundary: a failed run
//! leaves the workflow in `Failed` and ready for the next `run`.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by workflow and runner operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Input failed validation. No state transition happened.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A run is already in flight on this workflow.
    #[error("an analysis is already running")]
    AlreadyRunning,

    /// The browser could not report an active tab.
    #[error(transparent)]
    NoActiveTab(#[from] NoActiveTab),

    /// The capability failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// The run was cancelled before it finished.
    #[error("analysis cancelled")]
    Cancelled,
}

impl WorkflowError {
    /// Shorthand for an [`WorkflowError::InvalidInput`] error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True for errors raised before the run started.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::AlreadyRunning)
    }
}

/// Failures reported by an analysis capability.
///
/// `Clone` so the reason can be kept inside `AnalysisState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Network request failed
    #[error("network error: {0}")]
    Network(String),

    /// Input could not be parsed (e.g. unreadable PDF)
    #[error("parse error: {0}")]
    Parse(String),

    /// An upstream service (reputation lookup, language model) failed
    #[error("{service} error: {message}")]
    Upstream { service: String, message: String },

    /// The capability gave up waiting
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The capability refused the input
    #[error("rejected: {0}")]
    Rejected(String),

    /// The capability panicked
    #[error("capability panicked: {0}")]
    Panicked(String),
}

impl AnalysisError {
    /// Build an [`AnalysisError::Upstream`] error.
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// The browser context had no active tab to read a URL from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no active tab{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
pub struct NoActiveTab {
    pub reason: Option<String>,
}

impl NoActiveTab {
    pub fn new() -> Self {
        Self { reason: None }
    }

    pub fn because(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl Default for NoActiveTab {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type alias for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Result type alias for capability calls.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
