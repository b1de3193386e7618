//! Subscriber list normalization and address validation.
//!
//! Accepted address grammar (deliberately conservative, not RFC 5322):
//!
//! ```text
//! ^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$
//! ```
//!
//! i.e. word-character segments joined by single `.` or `-` on both sides of
//! the `@`, ending in one or more 2–3 character labels.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use rb_status_core::ValidationIssue;

const EMAIL_PATTERN: &str = r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$";

static EMAIL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| match Regex::new(EMAIL_PATTERN) {
    Ok(regex) => Some(regex),
    Err(e) => {
        tracing::error!(error = %e, "email pattern failed to compile");
        None
    }
});

/// Whether a single, already stripped address matches the accepted grammar.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_REGEX
        .as_ref()
        .is_some_and(|regex| regex.is_match(address))
}

/// Strip every whitespace character from one address.
fn strip_address(part: &str) -> String {
    part.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Split one comma-separated field into stripped, non-blank addresses.
fn split_addresses(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(strip_address).filter(|part| !part.is_empty())
}

/// Split the owner field. Every comma-separated part counts, blank or not,
/// so `"a@b.com,"` holds two entries. A blank field holds none.
fn split_owner(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(strip_address).collect()
}

/// Result of normalizing an owner and a subscriber list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmails {
    /// The owner's address with whitespace removed.
    pub owner: String,
    /// Sorted, deduplicated, always contains [`NormalizedEmails::owner`].
    pub subscribers: Vec<String>,
}

/// Build the subscriber list for a report.
///
/// The owner field must hold exactly one address. It is merged with every
/// subscriber entry (each entry may itself be comma-separated), whitespace
/// is removed, blanks dropped, duplicates removed, and the result sorted.
/// Every invalid address is reported, not just the first.
pub fn normalize_emails<I, S>(owner: &str, subscribers: I) -> Result<NormalizedEmails, Vec<ValidationIssue>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut issues = Vec::new();

    let owners = split_owner(owner);
    if owners.len() != 1 {
        issues.push(ValidationIssue::InvalidOwnerEmail {
            count: owners.len(),
        });
    }

    let mut emails: BTreeSet<String> = owners.iter().filter(|o| !o.is_empty()).cloned().collect();
    for entry in subscribers {
        emails.extend(split_addresses(entry.as_ref()));
    }

    for address in &emails {
        if !is_valid_email(address) {
            issues.push(ValidationIssue::InvalidEmail {
                address: address.clone(),
            });
        }
    }

    match owners.into_iter().next() {
        Some(owner) if issues.is_empty() => Ok(NormalizedEmails {
            owner,
            subscribers: emails.into_iter().collect(),
        }),
        _ => Err(issues),
    }
}

/// [`normalize_emails`] for a single comma-separated subscriber field.
pub fn normalize_email_list(owner: &str, subscribers: &str) -> Result<NormalizedEmails, Vec<ValidationIssue>> {
    normalize_emails(owner, [subscribers])
}
