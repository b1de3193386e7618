//! Notification payload for one finished report run.

use std::collections::HashMap;

use chrono::SecondsFormat;
use serde::Serialize;

use rb_status_core::{ReportDefinition, ReportOutcome, ReportsConfig};

use crate::templating::TemplateRenderer;
use crate::traits::{Notification, NotifyError};

/// Values exposed to the subject and body templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportParams {
    pub passed: bool,
    /// `"Passed"` or `"Failed"`.
    pub status: String,
    /// RFC 3339, UTC.
    pub updated_at: String,
    pub title: String,
    pub details_link: String,
    pub failure_detail: Option<String>,
}

/// Everything needed to notify a report's subscribers, before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportNotification {
    pub report_id: String,
    pub recipients: Vec<String>,
    pub params: ReportParams,
}

/// `<base>/<slug>`, tolerating a trailing slash on the base.
pub fn details_link(base_url: &str, title_slug: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), title_slug)
}

impl ReportNotification {
    pub fn build(
        definition: &ReportDefinition,
        outcome: &ReportOutcome,
        config: &ReportsConfig,
    ) -> Self {
        Self {
            report_id: definition.report_id.clone(),
            recipients: definition.subscribers.clone(),
            params: ReportParams {
                passed: outcome.passed,
                status: outcome.status().to_string(),
                updated_at: outcome.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                title: definition.title.clone(),
                details_link: details_link(&config.details_base_url, &definition.title_slug),
                failure_detail: outcome.failure_detail.clone(),
            },
        }
    }

    /// Subject: `"[<status>] <title>"`.
    pub fn subject(&self, renderer: &TemplateRenderer) -> Result<String, NotifyError> {
        renderer.render_subject(&self.params)
    }

    pub fn render(&self, renderer: &TemplateRenderer) -> Result<Notification, NotifyError> {
        let subject = self.subject(renderer)?;
        let body = renderer.render_body(&self.params)?;
        let metadata = HashMap::from([
            ("report_id".to_string(), self.report_id.clone()),
            ("status".to_string(), self.params.status.clone()),
            ("updated_at".to_string(), self.params.updated_at.clone()),
        ]);
        Ok(Notification {
            recipients: self.recipients.clone(),
            subject,
            body,
            metadata,
        })
    }
}
