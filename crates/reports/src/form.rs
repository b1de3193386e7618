//! Raw form submission → validated [`ReportDefinition`].
//!
//! Each call builds its own issue list and returns an immutable value; no
//! state is carried between submissions.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rb_status_core::{
    IssueCollector, ReportDefinition, ReportsConfig, ScheduleType, UnitRef, ValidationFailure,
    ValidationIssue,
};

use crate::email::normalize_email_list;
use crate::identity::title_slug;
use crate::schedule::{compile_schedule, ScheduleInput};
use crate::validation::{ReportDraft, ReportValidator, SaveMode};

/// A report exactly as submitted: every field is raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
    pub owner_name: String,
    pub owner_email: String,
    /// Comma-separated addresses.
    pub subscribers: String,
    /// `daily`, `weekly`, `custom` or `manual`.
    pub schedule_type: String,
    /// Local `HH:MM`.
    pub schedule_time: String,
    /// `0` (Monday) .. `6` (Sunday).
    pub schedule_weekday: String,
    pub schedule_timezone: String,
    pub schedule_custom: String,
    /// `<unit-id>.<check-id>` references.
    pub tests: Vec<String>,
}

impl ReportForm {
    /// Refill a form from a saved report, for editing.
    pub fn from_definition(definition: &ReportDefinition) -> Self {
        let custom = match definition.schedule_type {
            ScheduleType::Custom => definition.schedule_cron.clone().unwrap_or_default(),
            _ => String::new(),
        };
        Self {
            title: definition.title.clone(),
            description: definition.description.clone(),
            owner_name: definition.owner_name.clone(),
            owner_email: definition.owner_email.clone(),
            subscribers: definition.subscribers.join(", "),
            schedule_type: definition.schedule_type.to_string(),
            schedule_time: definition.schedule_time_local.clone().unwrap_or_default(),
            schedule_weekday: definition
                .schedule_weekday
                .map(|d| d.to_string())
                .unwrap_or_default(),
            schedule_timezone: definition.schedule_timezone.clone(),
            schedule_custom: custom,
            tests: definition.tests.iter().map(UnitRef::to_string).collect(),
        }
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_schedule_type(raw: &str, issues: &mut IssueCollector) -> ScheduleType {
    match raw.trim() {
        "" => {
            issues.push(ValidationIssue::empty_field("schedule_type"));
            ScheduleType::Manual
        }
        value => value.parse().unwrap_or_else(|reason: String| {
            issues.push(ValidationIssue::invalid_schedule("schedule_type", reason));
            ScheduleType::Manual
        }),
    }
}

fn parse_weekday(raw: &str, issues: &mut IssueCollector) -> Option<u8> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u8>() {
        Ok(day) => Some(day),
        Err(_) => {
            issues.push(ValidationIssue::invalid_schedule(
                "schedule_weekday",
                format!("Weekday ({raw}) must be 0 (Monday) to 6 (Sunday)"),
            ));
            None
        }
    }
}

/// Parse test references, dropping blanks and repeats (first one wins).
fn parse_tests(raw: &[String], issues: &mut IssueCollector) -> Vec<UnitRef> {
    let mut seen = HashSet::new();
    let mut tests = Vec::new();
    for reference in raw.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        match UnitRef::parse(reference) {
            Some(unit) => {
                if seen.insert(unit.clone()) {
                    tests.push(unit);
                }
            }
            None => issues.push(ValidationIssue::InvalidTestReference {
                reference: reference.to_string(),
            }),
        }
    }
    tests
}

/// Compile and validate one submission against a registry snapshot.
///
/// Runs email normalization, schedule compilation, test reference parsing and
/// the validator, and reports every issue from every stage together.
pub fn compile_report(
    form: &ReportForm,
    mode: &SaveMode,
    existing: &[ReportDefinition],
    config: &ReportsConfig,
    now: DateTime<Utc>,
) -> Result<ReportDefinition, ValidationFailure> {
    let mut issues = IssueCollector::new();

    let title = form.title.trim().to_string();
    let slug = title_slug(&title);

    let (owner_email, subscribers) = match normalize_email_list(&form.owner_email, &form.subscribers) {
        Ok(emails) => (emails.owner, emails.subscribers),
        Err(found) => {
            issues.extend(found);
            (form.owner_email.trim().to_string(), Vec::new())
        }
    };

    let schedule_type = parse_schedule_type(&form.schedule_type, &mut issues);
    let weekday = if schedule_type.needs_weekday() {
        parse_weekday(&form.schedule_weekday, &mut issues)
    } else {
        None
    };
    let time = if schedule_type.needs_time() {
        non_blank(&form.schedule_time)
    } else {
        None
    };
    let timezone = form.schedule_timezone.trim().to_string();

    let mut cron = None;
    if !issues.has_field("schedule_type") {
        let input = ScheduleInput {
            schedule_type,
            time: time.clone(),
            weekday,
            timezone: timezone.clone(),
            custom_cron: non_blank(&form.schedule_custom),
        };
        match compile_schedule(&input, now) {
            Ok(compiled) => cron = compiled.cron,
            Err(found) => {
                for issue in found {
                    // An unparsable weekday was already reported above.
                    if issue.field() == "schedule_weekday" && issues.has_field("schedule_weekday") {
                        continue;
                    }
                    issues.push(issue);
                }
            }
        }
    }

    let tests = parse_tests(&form.tests, &mut issues);

    let draft = ReportDraft {
        title,
        title_slug: slug,
        description: form.description.trim().to_string(),
        owner_name: form.owner_name.trim().to_string(),
        owner_email,
        subscribers,
        schedule_type,
        schedule_time_local: time,
        schedule_weekday: weekday,
        schedule_timezone: timezone,
        schedule_cron: cron,
        tests,
    };

    ReportValidator::new(existing, &config.report_prefix).validate_with(draft, mode, issues)
}
