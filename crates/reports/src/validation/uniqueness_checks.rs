//! Registry-wide uniqueness checks.

use rb_status_core::{IssueCollector, ReportDefinition, ValidationIssue};

/// Flag `value` if any existing report already uses it for `field`.
///
/// When `editing` names a report id, that report is skipped; no other report
/// is ever excluded from the comparison.
pub(super) fn check_unique<F>(
    existing: &[ReportDefinition],
    editing: Option<&str>,
    field: &str,
    value: &str,
    field_of: F,
    issues: &mut IssueCollector,
) where
    F: Fn(&ReportDefinition) -> &str,
{
    let taken = existing
        .iter()
        .filter(|report| editing != Some(report.report_id.as_str()))
        .any(|report| field_of(report) == value);

    if taken {
        tracing::warn!(field, value, "already taken");
        issues.push(ValidationIssue::uniqueness(field, value));
    }
}
