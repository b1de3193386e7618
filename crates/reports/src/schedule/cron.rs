//! Cron formatting, structural checks, and read-back.

use chrono::{NaiveTime, Timelike, Weekday};

/// Field names and inclusive ranges of a 5-field cron expression.
const FIELDS: &[(&str, u32, u32)] = &[
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
    ("day-of-week", 0, 7),
];

/// Format `"<minute> <hour> * * <weekday-or-*>"` with unpadded numbers.
///
/// The weekday field uses cron numbering (0 = Sunday).
pub fn format_cron(utc_time: NaiveTime, weekday: Option<Weekday>) -> String {
    let dow = match weekday {
        Some(w) => w.num_days_from_sunday().to_string(),
        None => "*".to_string(),
    };
    format!("{} {} * * {}", utc_time.minute(), utc_time.hour(), dow)
}

/// Check a user-supplied cron string field by field.
///
/// Returns one message per problem; empty when the expression is well-formed.
pub fn check_cron(expr: &str) -> Vec<String> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return vec![format!(
            "Cron must have exactly 5 fields (min hour dom month dow), got {}",
            fields.len()
        )];
    }

    fields
        .iter()
        .zip(FIELDS.iter())
        .filter(|(field, (_, min, max))| !check_cron_field(field, *min, *max))
        .map(|(field, (name, _, _))| format!("Invalid cron {name} field: '{field}'"))
        .collect()
}

/// Supports *, N, N-M, */N, N-M/N, and comma-separated lists.
fn check_cron_field(field: &str, min: u32, max: u32) -> bool {
    for part in field.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return false;
        }

        let (range_part, step) = match part.split_once('/') {
            Some((r, s)) => match s.parse::<u32>() {
                Ok(v) if v > 0 => (r, Some(v)),
                _ => return false,
            },
            None => (part, None),
        };

        if range_part == "*" {
            if step.is_some_and(|s| s > max) {
                return false;
            }
            continue;
        }

        if let Some((start_s, end_s)) = range_part.split_once('-') {
            match (start_s.parse::<u32>(), end_s.parse::<u32>()) {
                (Ok(s), Ok(e)) if s >= min && e <= max && s <= e => {}
                _ => return false,
            }
        } else {
            match range_part.parse::<u32>() {
                Ok(v) if v >= min && v <= max => {}
                _ => return false,
            }
        }
    }
    true
}

/// Read a compiled cron back into its UTC time and optional weekday.
///
/// Only understands the shape produced by [`format_cron`]; anything else
/// (ranges, steps, a fixed day-of-month) yields `None`.
pub fn describe_cron(expr: &str) -> Option<(NaiveTime, Option<Weekday>)> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let [minute, hour, "*", "*", dow] = fields.as_slice() else {
        return None;
    };
    let time = NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)?;
    let weekday = match *dow {
        "*" => None,
        n => Some(weekday_from_cron(n.parse().ok()?)?),
    };
    Some((time, weekday))
}

fn weekday_from_cron(n: u32) -> Option<Weekday> {
    match n {
        0 | 7 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}
