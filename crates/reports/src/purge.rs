//! Deleting a report and every record derived from it.
//!
//! Each record kind has its own typed deletion routine on [`RecordStore`].
//! Kinds are removed dependents first so an interrupted purge never leaves a
//! schedule without its definition.

use std::fmt;

use serde::Serialize;

use rb_status_core::ReportDefinition;

use crate::identity::schedule_id;
use crate::registry::RegistryError;

/// Everything stored for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Per-attempt logs of the report's checks.
    Log,
    /// Persisted poll verdicts.
    Verdicts,
    RunHistory,
    /// The recurring schedule registered with the external scheduler.
    Schedule,
    Definition,
}

impl RecordKind {
    /// Deletion order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Log,
        RecordKind::Verdicts,
        RecordKind::RunHistory,
        RecordKind::Schedule,
        RecordKind::Definition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Log => "log",
            RecordKind::Verdicts => "verdicts",
            RecordKind::RunHistory => "run_history",
            RecordKind::Schedule => "schedule",
            RecordKind::Definition => "definition",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend holding the records of every kind. Each routine returns the
/// number of rows removed.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn delete_logs(&self, schedule_id: &str) -> Result<u64, RegistryError>;
    async fn delete_verdicts(&self, schedule_id: &str) -> Result<u64, RegistryError>;
    async fn delete_run_history(&self, schedule_id: &str) -> Result<u64, RegistryError>;
    async fn delete_schedule(&self, schedule_id: &str) -> Result<u64, RegistryError>;
    async fn delete_definition(&self, report_id: &str) -> Result<u64, RegistryError>;
}

#[derive(Debug, Clone, Copy)]
pub struct PurgeOptions {
    /// Leave [`RecordKind::Log`] records in place. On by default.
    pub keep_logs: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self { keep_logs: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub report_id: String,
    /// Rows removed per kind, in deletion order.
    pub deleted: Vec<(RecordKind, u64)>,
    pub kept: Vec<RecordKind>,
}

impl PurgeSummary {
    pub fn total(&self) -> u64 {
        self.deleted.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to delete {kind} records of {report_id}: {source}")]
pub struct PurgeError {
    pub report_id: String,
    pub kind: RecordKind,
    /// Kinds already removed before the failure.
    pub completed: Vec<RecordKind>,
    #[source]
    pub source: RegistryError,
}

/// Remove a report and its derived records, stopping at the first failure.
pub async fn purge_report(
    store: &dyn RecordStore,
    definition: &ReportDefinition,
    options: PurgeOptions,
) -> Result<PurgeSummary, PurgeError> {
    let report_id = definition.report_id.as_str();
    let schedule = schedule_id(&definition.title);
    let mut summary = PurgeSummary {
        report_id: report_id.to_string(),
        ..Default::default()
    };

    for kind in RecordKind::ALL {
        if kind == RecordKind::Log && options.keep_logs {
            summary.kept.push(kind);
            continue;
        }
        let result = match kind {
            RecordKind::Log => store.delete_logs(&schedule).await,
            RecordKind::Verdicts => store.delete_verdicts(&schedule).await,
            RecordKind::RunHistory => store.delete_run_history(&schedule).await,
            RecordKind::Schedule => store.delete_schedule(&schedule).await,
            RecordKind::Definition => store.delete_definition(report_id).await,
        };
        match result {
            Ok(count) => {
                tracing::debug!(report_id, kind = %kind, count, "records deleted");
                summary.deleted.push((kind, count));
            }
            Err(e) => {
                tracing::warn!(report_id, kind = %kind, error = %e, "purge failed");
                return Err(PurgeError {
                    report_id: report_id.to_string(),
                    kind,
                    completed: summary.deleted.iter().map(|(k, _)| *k).collect(),
                    source: e,
                });
            }
        }
    }

    tracing::info!(report_id, total = summary.total(), "report purged");
    Ok(summary)
}
