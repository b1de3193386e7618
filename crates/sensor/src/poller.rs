//! Completion poller: drives one check to a terminal verdict.
//!
//! ```text
//! Pending ──success/skipped──────────────▶ Succeeded
//!    │
//!    ├──failed/upstream_failed/shutdown/removed──▶ Failed (PollError::Failure)
//!    ├──budget exhausted───────────────────▶ Failed (PollError::Timeout)
//!    └──status backend error───────────────▶ Failed (PollError::Status)
//! ```
//!
//! Every other state, and "no run found", keeps the poller pending.

use std::time::Duration;

use tokio::time::Instant;

use rb_status_core::{PollState, PollVerdict, PollerConfig, UnitRef};

use crate::error::PollError;
use crate::status::{ExecutionStatus, RawState, StateBucket};

pub struct CompletionPoller {
    /// Task name, e.g. `test_etl.row_count`.
    name: String,
    unit: UnitRef,
    interval: Duration,
    timeout: Duration,
    max_attempts: Option<u32>,
    state: PollState,
    attempts: u32,
    last_seen: Option<RawState>,
}

impl CompletionPoller {
    pub fn new(name: impl Into<String>, unit: UnitRef, config: &PollerConfig) -> Self {
        Self {
            name: name.into(),
            unit,
            interval: config.interval(),
            timeout: config.timeout(),
            max_attempts: config.max_attempts,
            state: PollState::Pending,
            attempts: 0,
            last_seen: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &UnitRef {
        &self.unit
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Status checks made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Raw state returned by the latest check, if a run was found.
    pub fn last_seen(&self) -> Option<RawState> {
        self.last_seen
    }

    /// Apply one observed raw state to the machine.
    pub fn observe(&mut self, raw: Option<RawState>) -> Result<PollState, PollError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        self.last_seen = raw;

        let Some(raw) = raw else {
            tracing::debug!(unit = %self.name, attempt = self.attempts, "no run found yet");
            return Ok(self.state);
        };

        match raw.bucket() {
            StateBucket::Success => {
                self.state = PollState::Succeeded;
                tracing::info!(unit = %self.name, state = %raw, attempts = self.attempts, "check succeeded");
            }
            StateBucket::Failure => {
                self.state = PollState::Failed;
                tracing::info!(unit = %self.name, state = %raw, attempts = self.attempts, "check failed");
                return Err(PollError::Failure {
                    unit_ref: self.name.clone(),
                    state: raw,
                });
            }
            StateBucket::InFlight => {
                tracing::debug!(unit = %self.name, state = %raw, attempt = self.attempts, "check in flight");
            }
        }
        Ok(self.state)
    }

    /// Ask the execution engine once and apply the answer.
    pub async fn poll_once(&mut self, status: &dyn ExecutionStatus) -> Result<PollState, PollError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        self.attempts += 1;
        let raw = match status.latest_run_state(&self.unit).await {
            Ok(raw) => raw,
            Err(e) => {
                self.state = PollState::Failed;
                tracing::warn!(unit = %self.name, error = %e, "status lookup failed");
                return Err(PollError::Status {
                    unit_ref: self.name.clone(),
                    source: e,
                });
            }
        };
        self.observe(raw)
    }

    fn budget_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.timeout || self.max_attempts.is_some_and(|max| self.attempts >= max)
    }

    /// Poll until the check reaches a terminal state or the budget runs out.
    ///
    /// Only success yields `Ok`; the last check happens at the deadline, so a
    /// run finishing just in time is still seen.
    pub async fn run(&mut self, status: &dyn ExecutionStatus) -> Result<PollVerdict, PollError> {
        let start = Instant::now();

        loop {
            if self.poll_once(status).await? == PollState::Succeeded {
                return Ok(PollVerdict::succeeded(self.name.clone()));
            }

            let elapsed = start.elapsed();
            if self.budget_exhausted(elapsed) {
                self.state = PollState::Failed;
                tracing::warn!(
                    unit = %self.name,
                    attempts = self.attempts,
                    elapsed_secs = elapsed.as_secs(),
                    "check timed out"
                );
                return Err(PollError::Timeout {
                    unit_ref: self.name.clone(),
                    elapsed_secs: elapsed.as_secs(),
                    attempts: self.attempts,
                    last_state: self.last_seen,
                });
            }

            let remaining = self.timeout.saturating_sub(elapsed);
            tokio::time::sleep(self.interval.min(remaining)).await;
        }
    }
}
