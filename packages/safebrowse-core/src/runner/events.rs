//! Transition events broadcast by a runner.
//!
//! The watch channel only keeps the latest state, so a slow observer can
//! skip intermediate progress values. Observers that need every accepted
//! transition (progress bars, audit logs, tests) subscribe here instead.
//!
//! Delivery is at-most-once: lagging receivers get `RecvError::Lagged`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::FailureReason;

/// Identifies one invocation of `run` on a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(pub(crate) u64);

impl RunId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// One accepted state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerEvent {
    pub run: RunId,
    pub at: DateTime<Utc>,
    pub kind: RunnerEventKind,
}

impl RunnerEvent {
    pub(crate) fn now(run: RunId, kind: RunnerEventKind) -> Self {
        Self {
            run,
            at: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerEventKind {
    /// Entered `Running(0)`.
    Started,
    /// Progress advanced to `percent`.
    Progress { percent: u8 },
    /// Entered `Completed`.
    Completed,
    /// Entered `Failed`.
    Failed { reason: FailureReason },
}

impl RunnerEventKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}
