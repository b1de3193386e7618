//! Required-field checks.

use rb_status_core::{IssueCollector, ScheduleType, ValidationIssue};

use super::ReportDraft;

const SCHEDULE_FIELDS: [&str; 5] = [
    "schedule_type",
    "schedule_cron",
    "schedule_time",
    "schedule_weekday",
    "schedule_timezone",
];

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_opt(value: Option<&str>) -> bool {
    value.map_or(true, blank)
}

/// Flag every required field that is empty.
///
/// Schedule fields are required per schedule type: manual needs none, custom
/// needs only the cron expression, daily adds time and timezone, weekly adds
/// the weekday. A subscriber list is only flagged when no earlier stage
/// already rejected the email fields.
pub(super) fn check_required(
    draft: &ReportDraft,
    upstream_email_issue: bool,
    issues: &mut IssueCollector,
) {
    let text_fields = [
        ("title", draft.title.as_str()),
        ("title_slug", draft.title_slug.as_str()),
        ("description", draft.description.as_str()),
        ("owner_name", draft.owner_name.as_str()),
        ("owner_email", draft.owner_email.as_str()),
    ];
    for (field, value) in text_fields {
        // An empty title already explains an empty slug.
        if field == "title_slug" && blank(&draft.title) {
            continue;
        }
        if blank(value) && !issues.has_field(field) {
            issues.push(ValidationIssue::empty_field(field));
        }
    }

    if draft.subscribers.is_empty() && !upstream_email_issue {
        issues.push(ValidationIssue::empty_field("subscribers"));
    }

    if draft.tests.is_empty() && !issues.has_field("tests") {
        issues.push(ValidationIssue::empty_field("tests"));
    }

    let schedule = draft.schedule_type;
    // A missing cron is the consequence of an earlier schedule problem.
    let upstream_schedule_issue = SCHEDULE_FIELDS.iter().any(|f| issues.has_field(f));
    if schedule.has_cron()
        && !upstream_schedule_issue
        && blank_opt(draft.schedule_cron.as_deref())
    {
        issues.push(ValidationIssue::empty_field("schedule_cron"));
    }
    if schedule.needs_time() {
        if blank_opt(draft.schedule_time_local.as_deref()) {
            issues.push(ValidationIssue::empty_field("schedule_time"));
        }
        if blank(&draft.schedule_timezone) {
            issues.push(ValidationIssue::empty_field("schedule_timezone"));
        }
    }
    if schedule.needs_weekday()
        && draft.schedule_weekday.is_none()
        && !issues.has_field("schedule_weekday")
    {
        issues.push(ValidationIssue::empty_field("schedule_weekday"));
    }
    if schedule == ScheduleType::Manual && draft.schedule_cron.is_some() {
        issues.push(ValidationIssue::invalid_schedule(
            "schedule_cron",
            "Manual schedules can not carry a cron expression",
        ));
    }
}
