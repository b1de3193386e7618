//! Identifiers derived from report titles: URL slugs, report ids, schedule
//! ids and manual run ids.

use unicode_normalization::UnicodeNormalization;

pub use rb_status_core::manual_run_id;

/// Make a title URL-safe.
///
/// Accented letters are transliterated through NFKD decomposition and any
/// character still outside ASCII is dropped. The rest is lowercased, ASCII
/// letters, digits, `-` and `_` are kept, every other run of characters
/// becomes `separator`, repeated separators collapse and are trimmed from
/// both ends. `"Alpha"` → `"alpha"`, `"Nightly ETL: Sales!"` →
/// `"nightly-etl-sales"`, `"Café Über"` → `"cafe-uber"`.
pub fn parameterize(title: &str, separator: char) -> String {
    let mut result = String::with_capacity(title.len());
    let mut last_was_sep = false;

    for c in title.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if c == separator {
                if !last_was_sep && !result.is_empty() {
                    result.push(c);
                }
                last_was_sep = true;
            } else {
                result.push(c.to_ascii_lowercase());
                last_was_sep = false;
            }
        } else {
            if !last_was_sep && !result.is_empty() {
                result.push(separator);
            }
            last_was_sep = true;
        }
    }

    // Trim trailing separator.
    if result.ends_with(separator) {
        result.pop();
    }
    result
}

/// URL slug for a report title.
pub fn title_slug(title: &str) -> String {
    parameterize(title, '-')
}

/// Id assigned to a newly created report.
pub fn new_report_id(prefix: &str, slug: &str) -> String {
    format!("{prefix}{slug}")
}

/// Identifier of the recurring schedule generated for a report,
/// e.g. `"Nightly ETL"` → `"rb_status_nightly_etl"`.
pub fn schedule_id(title: &str) -> String {
    parameterize(&format!("rb status {title}"), '_').replace('-', "_")
}
