//! End-to-end tests for the form → validation → registry pipeline.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use rb_status_core::{ReportsConfig, ScheduleType, ValidationIssue};
use rb_status_reports::{
    InMemoryRegistry, ReportForm, ReportRegistry, ReportSaver, SaveError, SaveMode,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

fn form(title: &str, schedule_type: &str) -> ReportForm {
    ReportForm {
        title: title.to_string(),
        description: "Warehouse sanity checks".to_string(),
        owner_name: "Dana".to_string(),
        owner_email: "dana@corp.com".to_string(),
        subscribers: "ops@corp.com,  qa@corp.com".to_string(),
        schedule_type: schedule_type.to_string(),
        schedule_time: "02:00".to_string(),
        schedule_weekday: "0".to_string(),
        schedule_timezone: "Asia/Tokyo".to_string(),
        schedule_custom: "*/15 * * * *".to_string(),
        tests: vec!["warehouse.row_count".to_string()],
    }
}

fn unwrap_invalid(err: SaveError) -> Vec<ValidationIssue> {
    match err {
        SaveError::Invalid(failure) => failure.issues,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ── Schedules ───────────────────────────────────────────────

#[tokio::test]
async fn each_schedule_type_persists_its_cron() {
    let registry = Arc::new(InMemoryRegistry::new());
    let saver = ReportSaver::new(registry.clone(), ReportsConfig::default());

    let weekly = saver.save(&form("Weekly", "weekly"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(weekly.schedule_cron.as_deref(), Some("0 17 * * 0"));

    let daily = saver.save(&form("Daily", "daily"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(daily.schedule_cron.as_deref(), Some("0 17 * * *"));

    let custom = saver.save(&form("Custom", "custom"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(custom.schedule_cron.as_deref(), Some("*/15 * * * *"));

    let manual = saver.save(&form("Manual", "manual"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(manual.schedule_type, ScheduleType::Manual);
    assert!(manual.schedule_cron.is_none());

    assert_eq!(registry.list_reports().await.unwrap().len(), 4);
}

// ── Uniqueness ──────────────────────────────────────────────

#[tokio::test]
async fn second_alpha_is_rejected() {
    let registry = Arc::new(InMemoryRegistry::new());
    let saver = ReportSaver::new(registry.clone(), ReportsConfig::default());

    let first = saver.save(&form("Alpha", "daily"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(first.report_id, "rb_status_alpha");

    let issues = unwrap_invalid(
        saver
            .save(&form("Alpha", "daily"), &SaveMode::Create, now())
            .await
            .unwrap_err(),
    );
    assert!(issues.contains(&ValidationIssue::uniqueness("report_id", "rb_status_alpha")));
}

#[tokio::test]
async fn custom_prefix_is_applied() {
    let config = ReportsConfig {
        report_prefix: "team_".to_string(),
        ..ReportsConfig::default()
    };
    let saver = ReportSaver::new(Arc::new(InMemoryRegistry::new()), config);
    let report = saver.save(&form("Alpha", "daily"), &SaveMode::Create, now()).await.unwrap();
    assert_eq!(report.report_id, "team_alpha");
}

// ── Serialization ───────────────────────────────────────────

#[tokio::test]
async fn failure_serializes_every_issue() {
    let saver = ReportSaver::new(Arc::new(InMemoryRegistry::new()), ReportsConfig::default());
    let mut bad = form("", "weekly");
    bad.subscribers = "not-an-email".to_string();
    bad.schedule_time = "25:00".to_string();

    let issues = unwrap_invalid(saver.save(&bad, &SaveMode::Create, now()).await.unwrap_err());
    let json = serde_json::to_value(&issues).unwrap();
    let kinds: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"invalid_email"));
    assert!(kinds.contains(&"invalid_schedule"));
    assert!(kinds.contains(&"empty_field"));
}

#[tokio::test]
async fn definition_json_uses_unit_ref_strings() {
    let saver = ReportSaver::new(Arc::new(InMemoryRegistry::new()), ReportsConfig::default());
    let report = saver.save(&form("Alpha", "manual"), &SaveMode::Create, now()).await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["tests"][0], "warehouse.row_count");
    assert_eq!(json["schedule_type"], "manual");
    assert_eq!(
        json["subscribers"],
        serde_json::json!(["dana@corp.com", "ops@corp.com", "qa@corp.com"])
    );
}
