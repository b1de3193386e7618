//! Report definition types shared by the save-time and run-time crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// How a report is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    Weekly,
    /// User-supplied cron expression, stored verbatim.
    Custom,
    /// No cron; runs only on an external trigger.
    Manual,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Daily => "daily",
            ScheduleType::Weekly => "weekly",
            ScheduleType::Custom => "custom",
            ScheduleType::Manual => "manual",
        }
    }

    /// Whether a local time-of-day must be supplied.
    pub fn needs_time(&self) -> bool {
        matches!(self, ScheduleType::Daily | ScheduleType::Weekly)
    }

    pub fn needs_weekday(&self) -> bool {
        matches!(self, ScheduleType::Weekly)
    }

    pub fn has_cron(&self) -> bool {
        !matches!(self, ScheduleType::Manual)
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(ScheduleType::Daily),
            "weekly" => Ok(ScheduleType::Weekly),
            "custom" => Ok(ScheduleType::Custom),
            "manual" => Ok(ScheduleType::Manual),
            other => Err(format!("unknown schedule type: '{}'", other)),
        }
    }
}

/// Reference to one check of an external unit of work: `"<unit-id>.<check-id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitRef {
    pub unit_id: String,
    pub check_id: String,
}

impl UnitRef {
    pub fn new(unit_id: impl Into<String>, check_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            check_id: check_id.into(),
        }
    }

    /// Split on the first `.`; both halves must be non-empty.
    pub fn parse(reference: &str) -> Option<Self> {
        let (unit, check) = reference.trim().split_once('.')?;
        if unit.is_empty() || check.is_empty() {
            return None;
        }
        Some(Self::new(unit, check))
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unit_id, self.check_id)
    }
}

impl TryFrom<String> for UnitRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UnitRef::parse(&value).ok_or_else(|| format!("invalid unit reference: '{}'", value))
    }
}

impl From<UnitRef> for String {
    fn from(value: UnitRef) -> Self {
        value.to_string()
    }
}

/// A persist-ready status report.
///
/// Only produced by the compile + validate pipeline; the derived fields
/// (`title_slug`, `subscribers`, `schedule_cron`) are always recomputed
/// together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub report_id: String,
    pub title_slug: String,
    pub title: String,
    pub description: String,
    pub owner_name: String,
    pub owner_email: String,
    /// Deduplicated, sorted, always includes the owner.
    pub subscribers: Vec<String>,
    pub schedule_type: ScheduleType,
    /// Local `HH:MM`, daily and weekly only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_time_local: Option<String>,
    /// 0 = Monday .. 6 = Sunday, weekly only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_weekday: Option<u8>,
    #[serde(default)]
    pub schedule_timezone: String,
    /// UTC cron; `None` iff the schedule is manual.
    pub schedule_cron: Option<String>,
    pub tests: Vec<UnitRef>,
}

impl ReportDefinition {
    pub fn is_manual(&self) -> bool {
        self.schedule_type == ScheduleType::Manual
    }
}

/// Run id for an externally triggered (manual) run.
pub fn manual_run_id(at: DateTime<Utc>) -> String {
    format!(
        "rb_status_manual__{}",
        at.to_rfc3339_opts(SecondsFormat::Micros, false)
    )
}
