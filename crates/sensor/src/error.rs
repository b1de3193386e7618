use crate::status::{RawState, StatusError};

fn describe_last(state: &Option<RawState>) -> &'static str {
    state.map_or("no run found", |s| s.as_str())
}

/// Terminal errors of one poller.
///
/// `Failure` means the check itself failed; `Timeout` and `Status` mean the
/// poller could not reach a verdict.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(
        "Timed out waiting for {unit_ref} after {elapsed_secs}s ({attempts} checks, last state: {})",
        describe_last(.last_state)
    )]
    Timeout {
        unit_ref: String,
        elapsed_secs: u64,
        attempts: u32,
        last_state: Option<RawState>,
    },

    #[error("{unit_ref} finished in state {state}")]
    Failure { unit_ref: String, state: RawState },

    #[error("Could not read the run state of {unit_ref}: {source}")]
    Status {
        unit_ref: String,
        #[source]
        source: StatusError,
    },
}

impl PollError {
    pub fn unit_ref(&self) -> &str {
        match self {
            PollError::Timeout { unit_ref, .. }
            | PollError::Failure { unit_ref, .. }
            | PollError::Status { unit_ref, .. } => unit_ref,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout { .. })
    }
}
