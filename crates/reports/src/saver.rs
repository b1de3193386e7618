//! Form submission → registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use rb_status_core::{ReportDefinition, ReportsConfig, ValidationFailure};

use crate::form::{compile_report, ReportForm};
use crate::registry::{RegistryError, ReportRegistry};
use crate::validation::SaveMode;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Report is invalid: {0}")]
    Invalid(#[from] ValidationFailure),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Compiles submissions against the current registry and persists them.
pub struct ReportSaver {
    registry: Arc<dyn ReportRegistry>,
    config: ReportsConfig,
}

impl ReportSaver {
    pub fn new(registry: Arc<dyn ReportRegistry>, config: ReportsConfig) -> Self {
        Self { registry, config }
    }

    pub async fn save(
        &self,
        form: &ReportForm,
        mode: &SaveMode,
        now: DateTime<Utc>,
    ) -> Result<ReportDefinition, SaveError> {
        let existing = self.registry.list_reports().await?;
        let definition = compile_report(form, mode, &existing, &self.config, now)?;
        self.registry.persist(&definition).await?;
        tracing::info!(
            report_id = %definition.report_id,
            schedule = %definition.schedule_type,
            "report saved"
        );
        Ok(definition)
    }
}
