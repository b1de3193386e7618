//! Report validation against a registry snapshot.
//!
//! Checks required fields and the global uniqueness of `report_id` and
//! `title_slug`. Every violated rule is collected; nothing short-circuits.
//!
//! The snapshot is read without a lock. Two concurrent creations picking the
//! same slug can both pass here; the persistence layer's own uniqueness
//! constraint has to catch that race.

mod field_checks;
mod uniqueness_checks;


use serde::{Deserialize, Serialize};

use rb_status_core::{
    IssueCollector, ReportDefinition, ScheduleType, UnitRef, ValidationFailure, ValidationIssue,
};

use crate::identity::new_report_id;

/// Whether a submission creates a report or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SaveMode {
    Create,
    /// The id is supplied by the caller and preserved.
    Edit { report_id: String },
}

/// A compiled but not yet validated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub title: String,
    pub title_slug: String,
    pub description: String,
    pub owner_name: String,
    pub owner_email: String,
    pub subscribers: Vec<String>,
    pub schedule_type: ScheduleType,
    pub schedule_time_local: Option<String>,
    pub schedule_weekday: Option<u8>,
    pub schedule_timezone: String,
    pub schedule_cron: Option<String>,
    pub tests: Vec<UnitRef>,
}

impl ReportDraft {
    fn into_definition(self, report_id: String) -> ReportDefinition {
        ReportDefinition {
            report_id,
            title_slug: self.title_slug,
            title: self.title,
            description: self.description,
            owner_name: self.owner_name,
            owner_email: self.owner_email,
            subscribers: self.subscribers,
            schedule_type: self.schedule_type,
            schedule_time_local: self.schedule_time_local,
            schedule_weekday: self.schedule_weekday,
            schedule_timezone: self.schedule_timezone,
            schedule_cron: self.schedule_cron,
            tests: self.tests,
        }
    }
}

/// Decides whether a draft may be persisted, given the reports that exist.
pub struct ReportValidator<'a> {
    existing: &'a [ReportDefinition],
    report_prefix: &'a str,
}

impl<'a> ReportValidator<'a> {
    pub fn new(existing: &'a [ReportDefinition], report_prefix: &'a str) -> Self {
        Self {
            existing,
            report_prefix,
        }
    }

    /// Validate a draft on its own.
    pub fn validate(
        &self,
        draft: ReportDraft,
        mode: &SaveMode,
    ) -> Result<ReportDefinition, ValidationFailure> {
        self.validate_with(draft, mode, IssueCollector::new())
    }

    /// Validate a draft, merging issues already found by earlier stages
    /// (email normalization, schedule compilation).
    pub fn validate_with(
        &self,
        draft: ReportDraft,
        mode: &SaveMode,
        mut issues: IssueCollector,
    ) -> Result<ReportDefinition, ValidationFailure> {
        let upstream_email_issue = issues.has_field("subscribers") || issues.has_field("owner_email");
        field_checks::check_required(&draft, upstream_email_issue, &mut issues);

        let report_id = match mode {
            SaveMode::Create => {
                let id = new_report_id(self.report_prefix, &draft.title_slug);
                if !draft.title_slug.is_empty() {
                    uniqueness_checks::check_unique(
                        self.existing,
                        None,
                        "report_id",
                        &id,
                        |r| r.report_id.as_str(),
                        &mut issues,
                    );
                }
                id
            }
            SaveMode::Edit { report_id } => {
                if report_id.trim().is_empty() {
                    issues.push(ValidationIssue::empty_field("report_id"));
                }
                report_id.clone()
            }
        };

        let editing = match mode {
            SaveMode::Edit { report_id } => Some(report_id.as_str()),
            SaveMode::Create => None,
        };
        if !draft.title_slug.is_empty() {
            uniqueness_checks::check_unique(
                self.existing,
                editing,
                "title_slug",
                &draft.title_slug,
                |r| r.title_slug.as_str(),
                &mut issues,
            );
        }

        if !issues.is_empty() {
            tracing::info!(
                report_id = %report_id,
                issues = issues.len(),
                "report rejected"
            );
        }
        issues.finish(draft.into_definition(report_id))
    }
}
