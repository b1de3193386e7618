//! One run of a report: poll every declared test, then aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use rb_status_core::{
    manual_run_id, PollVerdict, PollerConfig, ReportDefinition, ReportOutcome, ReportsConfig, UnitRef,
};

use crate::aggregator::ReportAggregator;
use crate::poller::CompletionPoller;
use crate::status::ExecutionStatus;

/// Outcome of an externally triggered run, with the id it ran under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualRun {
    pub run_id: String,
    pub outcome: ReportOutcome,
}

pub struct ReportRun {
    status: Arc<dyn ExecutionStatus>,
    poller: PollerConfig,
    test_prefix: String,
    aggregator: ReportAggregator,
}

impl ReportRun {
    pub fn new(status: Arc<dyn ExecutionStatus>, reports: &ReportsConfig, poller: &PollerConfig) -> Self {
        Self {
            status,
            poller: poller.clone(),
            test_prefix: reports.test_prefix.clone(),
            aggregator: ReportAggregator::from_config(reports),
        }
    }

    /// Task name of the poller for one test reference.
    pub fn poller_name(&self, unit: &UnitRef) -> String {
        format!("{}{}", self.test_prefix, unit)
    }

    pub fn poller_names(&self, definition: &ReportDefinition) -> Vec<String> {
        definition.tests.iter().map(|u| self.poller_name(u)).collect()
    }

    /// Run one poller per declared test concurrently and wait for all of them.
    ///
    /// A failing poller never cancels its siblings; its error becomes a
    /// failed verdict carrying the error text.
    pub async fn collect_verdicts(&self, definition: &ReportDefinition) -> Vec<PollVerdict> {
        let pollers = definition.tests.iter().map(|unit| {
            let mut poller = CompletionPoller::new(self.poller_name(unit), unit.clone(), &self.poller);
            let status = Arc::clone(&self.status);
            async move {
                match poller.run(status.as_ref()).await {
                    Ok(verdict) => verdict,
                    Err(e) => {
                        tracing::warn!(unit = %poller.name(), error = %e, "poller finished with error");
                        PollVerdict::failed(poller.name(), e.to_string())
                    }
                }
            }
        });
        join_all(pollers).await
    }

    /// Poll every test and aggregate the verdicts into an outcome stamped
    /// with `now`, the run's logical instant.
    pub async fn execute(&self, definition: &ReportDefinition, now: DateTime<Utc>) -> ReportOutcome {
        tracing::info!(
            report_id = %definition.report_id,
            tests = definition.tests.len(),
            "report run started"
        );
        let verdicts = self.collect_verdicts(definition).await;
        let names = self.poller_names(definition);
        let outcome = self.aggregator.aggregate(&names, &verdicts, now);
        tracing::info!(
            report_id = %definition.report_id,
            passed = outcome.passed,
            "report run finished"
        );
        outcome
    }

    /// Run a report on demand. Works for every schedule type, and is the
    /// only way a manual report runs.
    pub async fn trigger(&self, definition: &ReportDefinition, now: DateTime<Utc>) -> ManualRun {
        let run_id = manual_run_id(now);
        tracing::info!(report_id = %definition.report_id, run_id = %run_id, "manual run triggered");
        let outcome = self.execute(definition, now).await;
        ManualRun { run_id, outcome }
    }
}
