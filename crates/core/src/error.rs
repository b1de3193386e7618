use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single rejected aspect of a submitted report.
///
/// Every variant names the field it applies to so the caller can present the
/// problem next to the offending input.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    #[error("Invalid schedule ({field}): {reason}")]
    InvalidSchedule { field: String, reason: String },

    #[error("Email ({address}) is not valid. Please enter a valid email address.")]
    InvalidEmail { address: String },

    #[error("Exactly one email is required for Owner Email field (got {count}).")]
    InvalidOwnerEmail { count: usize },

    #[error("{field} ({value}) already taken.")]
    UniquenessViolation { field: String, value: String },

    #[error("{field} can not be empty.")]
    EmptyField { field: String },

    #[error("Test reference ({reference}) must look like '<unit-id>.<check-id>'.")]
    InvalidTestReference { reference: String },
}

impl ValidationIssue {
    pub fn invalid_schedule(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    pub fn uniqueness(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UniquenessViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Name of the report field this issue applies to.
    pub fn field(&self) -> &str {
        match self {
            ValidationIssue::InvalidSchedule { field, .. } => field,
            ValidationIssue::InvalidEmail { .. } => "subscribers",
            ValidationIssue::InvalidOwnerEmail { .. } => "owner_email",
            ValidationIssue::UniquenessViolation { field, .. } => field,
            ValidationIssue::EmptyField { field } => field,
            ValidationIssue::InvalidTestReference { .. } => "tests",
        }
    }
}

/// Every issue found while validating one submission.
///
/// Validation never stops at the first problem; this carries the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Whether any issue of the given field was recorded.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field() == field)
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| format!("Error: {i}")).collect()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Accumulates issues across the validation stages of a single call.
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue; an identical issue is only kept once.
    pub fn push(&mut self, issue: ValidationIssue) {
        if self.issues.contains(&issue) {
            return;
        }
        tracing::debug!(field = issue.field(), "{issue}");
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field() == field)
    }

    /// `Ok(value)` when nothing was collected, otherwise every issue.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationFailure> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailure::new(self.issues))
        }
    }

    pub fn into_failure(self) -> ValidationFailure {
        ValidationFailure::new(self.issues)
    }
}
