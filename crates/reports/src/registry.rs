//! Persistence seam for report definitions.

use std::collections::BTreeMap;
use std::sync::RwLock;

use rb_status_core::ReportDefinition;

/// Errors raised by a registry backend.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry backend error: {0}")]
    Backend(String),

    /// The backend's own uniqueness constraint fired, e.g. two concurrent
    /// creations that both passed validation.
    #[error("{field} ({value}) already taken.")]
    Conflict { field: String, value: String },

    #[error("Registry lock poisoned")]
    LockPoisoned,
}

/// Store of all report definitions.
#[async_trait::async_trait]
pub trait ReportRegistry: Send + Sync {
    /// Snapshot of every saved report.
    async fn list_reports(&self) -> Result<Vec<ReportDefinition>, RegistryError>;

    /// Insert or replace the report keyed by `report_id`.
    async fn persist(&self, definition: &ReportDefinition) -> Result<(), RegistryError>;
}

/// Process-local registry keyed by report id.
///
/// Enforces `title_slug` uniqueness on write, so a race between two
/// validated creations surfaces as [`RegistryError::Conflict`].
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    reports: RwLock<BTreeMap<String, ReportDefinition>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reports(reports: impl IntoIterator<Item = ReportDefinition>) -> Self {
        let reports = reports
            .into_iter()
            .map(|r| (r.report_id.clone(), r))
            .collect();
        Self {
            reports: RwLock::new(reports),
        }
    }

    pub fn get(&self, report_id: &str) -> Result<Option<ReportDefinition>, RegistryError> {
        let reports = self.reports.read().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(reports.get(report_id).cloned())
    }

    /// Drop a report; returns whether it existed.
    pub fn remove(&self, report_id: &str) -> Result<bool, RegistryError> {
        let mut reports = self.reports.write().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(reports.remove(report_id).is_some())
    }

    pub fn len(&self) -> usize {
        self.reports.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ReportRegistry for InMemoryRegistry {
    async fn list_reports(&self) -> Result<Vec<ReportDefinition>, RegistryError> {
        let reports = self.reports.read().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(reports.values().cloned().collect())
    }

    async fn persist(&self, definition: &ReportDefinition) -> Result<(), RegistryError> {
        let mut reports = self.reports.write().map_err(|_| RegistryError::LockPoisoned)?;

        let clash = reports.values().any(|r| {
            r.report_id != definition.report_id && r.title_slug == definition.title_slug
        });
        if clash {
            return Err(RegistryError::Conflict {
                field: "title_slug".to_string(),
                value: definition.title_slug.clone(),
            });
        }

        let replaced = reports
            .insert(definition.report_id.clone(), definition.clone())
            .is_some();
        tracing::info!(report_id = %definition.report_id, replaced, "report persisted");
        Ok(())
    }
}
