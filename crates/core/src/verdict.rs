//! Run-time results: one verdict per polled check, one outcome per report run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of one polled check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Pending,
    Succeeded,
    Failed,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Pending)
    }
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollState::Pending => write!(f, "pending"),
            PollState::Succeeded => write!(f, "succeeded"),
            PollState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of checking one unit of work for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollVerdict {
    /// Poller name, e.g. `test_etl_daily.row_count`.
    pub unit_ref: String,
    pub state: PollState,
    /// Present only when `state` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PollVerdict {
    pub fn succeeded(unit_ref: impl Into<String>) -> Self {
        Self {
            unit_ref: unit_ref.into(),
            state: PollState::Succeeded,
            detail: None,
        }
    }

    pub fn failed(unit_ref: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            unit_ref: unit_ref.into(),
            state: PollState::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregate result of one report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub passed: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<String>,
}

impl ReportOutcome {
    /// Status label used in notification subjects.
    pub fn status(&self) -> &'static str {
        if self.passed {
            "Passed"
        } else {
            "Failed"
        }
    }
}
