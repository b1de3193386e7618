//! Execution-status collaborator and raw run-state classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rb_status_core::UnitRef;

/// Latest run state of a check, as reported by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawState {
    Success,
    Skipped,
    Failed,
    UpstreamFailed,
    Shutdown,
    Removed,
    Running,
    Queued,
    Scheduled,
    UpForRetry,
    UpForReschedule,
    /// A run exists but has not been assigned a state yet.
    None,
    /// Any state this crate does not know. Never treated as terminal.
    #[serde(other)]
    Unknown,
}

/// Coarse classification the poller acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBucket {
    Success,
    Failure,
    InFlight,
}

impl RawState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RawState::Success => "success",
            RawState::Skipped => "skipped",
            RawState::Failed => "failed",
            RawState::UpstreamFailed => "upstream_failed",
            RawState::Shutdown => "shutdown",
            RawState::Removed => "removed",
            RawState::Running => "running",
            RawState::Queued => "queued",
            RawState::Scheduled => "scheduled",
            RawState::UpForRetry => "up_for_retry",
            RawState::UpForReschedule => "up_for_reschedule",
            RawState::None => "none",
            RawState::Unknown => "unknown",
        }
    }

    pub fn bucket(&self) -> StateBucket {
        match self {
            RawState::Success | RawState::Skipped => StateBucket::Success,
            RawState::Failed | RawState::UpstreamFailed | RawState::Shutdown | RawState::Removed => {
                StateBucket::Failure
            }
            _ => StateBucket::InFlight,
        }
    }
}

impl fmt::Display for RawState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawState {
    type Err = String;

    /// Parses the engine's lowercase names; unrecognized names map to
    /// [`RawState::Unknown`] rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim().to_lowercase().as_str() {
            "" => return Err("empty run state".to_string()),
            "success" => RawState::Success,
            "skipped" => RawState::Skipped,
            "failed" => RawState::Failed,
            "upstream_failed" => RawState::UpstreamFailed,
            "shutdown" => RawState::Shutdown,
            "removed" => RawState::Removed,
            "running" => RawState::Running,
            "queued" => RawState::Queued,
            "scheduled" => RawState::Scheduled,
            "up_for_retry" => RawState::UpForRetry,
            "up_for_reschedule" => RawState::UpForReschedule,
            "none" => RawState::None,
            _ => RawState::Unknown,
        };
        Ok(state)
    }
}

/// Infrastructure failure while asking for a run state.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Execution engine unavailable: {0}")]
    Unavailable(String),

    #[error("Execution status backend error: {0}")]
    Backend(String),
}

/// Reports the most recent run state of a check.
#[async_trait::async_trait]
pub trait ExecutionStatus: Send + Sync {
    /// `Ok(None)` when no run of the check exists yet.
    async fn latest_run_state(&self, unit: &UnitRef) -> Result<Option<RawState>, StatusError>;
}
