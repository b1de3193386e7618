//! Combines the verdicts of one report run into a single outcome.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use rb_status_core::{AuxiliaryPolicy, PollState, PollVerdict, ReportOutcome, ReportsConfig};

pub struct ReportAggregator {
    test_prefix: String,
    policy: AuxiliaryPolicy,
}

impl ReportAggregator {
    pub fn new(test_prefix: impl Into<String>, policy: AuxiliaryPolicy) -> Self {
        Self {
            test_prefix: test_prefix.into(),
            policy,
        }
    }

    pub fn from_config(config: &ReportsConfig) -> Self {
        Self::new(config.test_prefix.clone(), config.auxiliary_failures)
    }

    /// Whether a poller name counts as a test rather than an auxiliary check.
    pub fn is_test(&self, name: &str) -> bool {
        name.starts_with(&self.test_prefix)
    }

    /// Aggregate verdicts for `declared` poller names.
    ///
    /// `passed` holds iff every declared test succeeded (plus every auxiliary
    /// check under [`AuxiliaryPolicy::Fail`]). The failure detail comes from
    /// the first failed test in declared order, falling back to the first
    /// counted auxiliary failure. A declared name without a verdict, or with
    /// a pending one, counts as failed.
    pub fn aggregate(
        &self,
        declared: &[String],
        verdicts: &[PollVerdict],
        now: DateTime<Utc>,
    ) -> ReportOutcome {
        let mut by_name: HashMap<&str, &PollVerdict> = HashMap::with_capacity(verdicts.len());
        for verdict in verdicts {
            by_name.entry(verdict.unit_ref.as_str()).or_insert(verdict);
        }

        let mut test_failure: Option<String> = None;
        let mut aux_failure: Option<String> = None;
        let mut passed = true;

        for name in declared {
            let Some(detail) = failure_detail(name, by_name.get(name.as_str()).copied()) else {
                continue;
            };
            if self.is_test(name) {
                passed = false;
                test_failure.get_or_insert(detail);
            } else {
                tracing::debug!(unit = %name, policy = %self.policy, "auxiliary check failed");
                if self.policy == AuxiliaryPolicy::Fail {
                    passed = false;
                    aux_failure.get_or_insert(detail);
                }
            }
        }

        let outcome = ReportOutcome {
            passed,
            updated_at: now,
            failure_detail: if passed { None } else { test_failure.or(aux_failure) },
        };
        tracing::info!(
            checks = declared.len(),
            passed = outcome.passed,
            "report aggregated"
        );
        outcome
    }
}

/// `None` for a success, otherwise the detail to report.
fn failure_detail(name: &str, verdict: Option<&PollVerdict>) -> Option<String> {
    match verdict {
        None => Some(format!("{name}: no verdict recorded")),
        Some(v) => match v.state {
            PollState::Succeeded => None,
            PollState::Pending => Some(format!("{name}: never reached a terminal state")),
            PollState::Failed => Some(
                v.detail
                    .clone()
                    .unwrap_or_else(|| format!("{name}: failed")),
            ),
        },
    }
}
