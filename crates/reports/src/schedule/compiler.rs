//! Local schedule description → canonical UTC cron.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use rb_status_core::{ScheduleType, ValidationIssue};

use super::cron::{check_cron, format_cron};

/// Weekdays indexed by the report convention: 0 = Monday .. 6 = Sunday.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Raw schedule fields as entered for one report.
#[derive(Debug, Clone)]
pub struct ScheduleInput {
    pub schedule_type: ScheduleType,
    /// Local `HH:MM`.
    pub time: Option<String>,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: Option<u8>,
    pub timezone: String,
    /// Verbatim expression for custom schedules.
    pub custom_cron: Option<String>,
}

/// Result of compiling a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSchedule {
    /// `None` iff the schedule is manual.
    pub cron: Option<String>,
    /// UTC `HH:MM` the cron fires at (daily and weekly only).
    pub utc_time: Option<String>,
    /// UTC weekday the cron fires on (weekly only).
    pub utc_weekday: Option<Weekday>,
}

impl CompiledSchedule {
    fn without_cron() -> Self {
        Self {
            cron: None,
            utc_time: None,
            utc_weekday: None,
        }
    }

    /// UTC weekday in the report convention (0 = Monday).
    pub fn utc_weekday_index(&self) -> Option<u8> {
        self.utc_weekday.map(weekday_index)
    }
}

/// Map the report weekday convention (0 = Monday .. 6 = Sunday) to [`Weekday`].
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    WEEKDAYS.get(usize::from(index)).copied()
}

pub fn weekday_index(weekday: Weekday) -> u8 {
    // num_days_from_monday is always < 7
    weekday.num_days_from_monday() as u8
}

/// Parse a local `HH:MM` time-of-day.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

pub fn parse_timezone(raw: &str) -> Option<Tz> {
    raw.trim().parse::<Tz>().ok()
}

/// Compile a schedule description into a UTC cron expression.
///
/// `now` anchors the "next occurrence" used to resolve the timezone offset,
/// so a weekday that crosses midnight in UTC rolls forward or backward with
/// the offset in effect on that date. Every problem found is returned.
pub fn compile_schedule(
    input: &ScheduleInput,
    now: DateTime<Utc>,
) -> Result<CompiledSchedule, Vec<ValidationIssue>> {
    match input.schedule_type {
        ScheduleType::Manual => Ok(CompiledSchedule::without_cron()),
        ScheduleType::Custom => compile_custom(input.custom_cron.as_deref()),
        ScheduleType::Daily | ScheduleType::Weekly => compile_local(input, now),
    }
}

fn compile_custom(raw: Option<&str>) -> Result<CompiledSchedule, Vec<ValidationIssue>> {
    let expr = raw.map(str::trim).unwrap_or_default();
    if expr.is_empty() {
        return Err(vec![ValidationIssue::empty_field("schedule_cron")]);
    }
    let problems = check_cron(expr);
    if !problems.is_empty() {
        return Err(problems
            .into_iter()
            .map(|reason| ValidationIssue::invalid_schedule("schedule_cron", reason))
            .collect());
    }
    Ok(CompiledSchedule {
        cron: Some(expr.to_string()),
        utc_time: None,
        utc_weekday: None,
    })
}

fn compile_local(
    input: &ScheduleInput,
    now: DateTime<Utc>,
) -> Result<CompiledSchedule, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let time = match input.time.as_deref().map(str::trim) {
        None | Some("") => {
            issues.push(ValidationIssue::empty_field("schedule_time"));
            None
        }
        Some(raw) => {
            let parsed = parse_time(raw);
            if parsed.is_none() {
                issues.push(ValidationIssue::invalid_schedule(
                    "schedule_time",
                    format!("Schedule's time ({raw}) is invalid, expected HH:MM"),
                ));
            }
            parsed
        }
    };

    let weekday = if input.schedule_type == ScheduleType::Weekly {
        match input.weekday {
            None => {
                issues.push(ValidationIssue::invalid_schedule(
                    "schedule_weekday",
                    "Weekly schedules require a weekday",
                ));
                None
            }
            Some(index) => {
                let parsed = weekday_from_index(index);
                if parsed.is_none() {
                    issues.push(ValidationIssue::invalid_schedule(
                        "schedule_weekday",
                        format!("Weekday ({index}) must be 0 (Monday) to 6 (Sunday)"),
                    ));
                }
                parsed
            }
        }
    } else {
        None
    };

    let tz = match input.timezone.trim() {
        "" => {
            issues.push(ValidationIssue::empty_field("schedule_timezone"));
            None
        }
        raw => {
            let parsed = parse_timezone(raw);
            if parsed.is_none() {
                issues.push(ValidationIssue::invalid_schedule(
                    "schedule_timezone",
                    format!("Unknown timezone '{raw}', expected an IANA name (e.g. 'America/New_York')"),
                ));
            }
            parsed
        }
    };

    let (time, tz) = match (time, tz) {
        (Some(time), Some(tz)) if issues.is_empty() => (time, tz),
        _ => return Err(issues),
    };
    let wants_weekday = input.schedule_type == ScheduleType::Weekly;

    let Some(instant) = next_occurrence(tz, time, weekday, now) else {
        return Err(vec![ValidationIssue::invalid_schedule(
            "schedule_time",
            "Schedule's time does not exist in the given timezone",
        )]);
    };

    let utc_time = instant.time();
    let utc_weekday = wants_weekday.then(|| instant.weekday());
    let cron = format_cron(utc_time, utc_weekday);

    tracing::debug!(
        timezone = %tz,
        local_time = %time.format("%H:%M"),
        utc = %instant,
        cron = %cron,
        "compiled schedule"
    );

    Ok(CompiledSchedule {
        cron: Some(cron),
        utc_time: Some(utc_time.format("%H:%M").to_string()),
        utc_weekday,
    })
}

/// The UTC instant of `time` on today's local date, or on the next
/// `weekday` strictly after today when one is given.
fn next_occurrence(
    tz: Tz,
    time: NaiveTime,
    weekday: Option<Weekday>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(&tz).date_naive();
    let date = match weekday {
        Some(target) => next_weekday_after(today, target)?,
        None => today,
    };

    let local = date.and_time(time);
    // DST gaps shift forward by an hour; ambiguous times take the earlier instant.
    let resolved = tz
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())?;
    Some(resolved.with_timezone(&Utc))
}

fn next_weekday_after(date: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let from = date.weekday().num_days_from_monday();
    let to = target.num_days_from_monday();
    let ahead = match (to + 7 - from) % 7 {
        0 => 7,
        n => n,
    };
    date.checked_add_days(Days::new(u64::from(ahead)))
}
