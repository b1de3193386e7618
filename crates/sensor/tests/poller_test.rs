//! Poller and report-run behaviour against a scripted execution engine.
//!
//! Time is paused, so multi-hour budgets elapse instantly.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use rb_status_core::{
    AuxiliaryPolicy, PollState, PollerConfig, ReportDefinition, ReportsConfig, ScheduleType,
    UnitRef,
};
use rb_status_sensor::{
    CompletionPoller, ExecutionStatus, PollError, RawState, ReportRun, StatusError,
};

// ── Scripted engine ─────────────────────────────────────────

/// Replays a script of answers per check; the last answer repeats forever.
#[derive(Default)]
struct ScriptedStatus {
    scripts: Mutex<HashMap<String, VecDeque<Result<Option<RawState>, String>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStatus {
    fn with(mut self, unit: &str, answers: Vec<Option<RawState>>) -> Self {
        self.scripts
            .get_mut()
            .unwrap()
            .insert(unit.to_string(), answers.into_iter().map(Ok).collect());
        self
    }

    fn failing(mut self, unit: &str, message: &str) -> Self {
        self.scripts
            .get_mut()
            .unwrap()
            .insert(unit.to_string(), VecDeque::from([Err(message.to_string())]));
        self
    }
}

#[async_trait::async_trait]
impl ExecutionStatus for ScriptedStatus {
    async fn latest_run_state(&self, unit: &UnitRef) -> Result<Option<RawState>, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        let Some(script) = scripts.get_mut(&unit.to_string()) else {
            return Ok(None);
        };
        let answer = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(Ok(None))
        };
        answer.map_err(StatusError::Backend)
    }
}

fn config(interval_secs: u64, timeout_secs: u64) -> PollerConfig {
    PollerConfig {
        interval_secs,
        timeout_secs,
        max_attempts: None,
    }
}

fn poller(unit: &str, config: &PollerConfig) -> CompletionPoller {
    let unit = UnitRef::parse(unit).unwrap();
    CompletionPoller::new(format!("test_{unit}"), unit, config)
}

// ── CompletionPoller ────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn skipped_succeeds_in_one_cycle() {
    let status = ScriptedStatus::default().with("etl.rows", vec![Some(RawState::Skipped)]);
    let mut p = poller("etl.rows", &config(60, 3600));

    let verdict = p.run(&status).await.unwrap();
    assert_eq!(verdict.state, PollState::Succeeded);
    assert_eq!(verdict.unit_ref, "test_etl.rows");
    assert!(verdict.detail.is_none());
    assert_eq!(p.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn upstream_failed_is_a_failure_error() {
    let status = ScriptedStatus::default().with(
        "etl.rows",
        vec![Some(RawState::Queued), Some(RawState::UpstreamFailed)],
    );
    let mut p = poller("etl.rows", &config(60, 3600));

    let err = p.run(&status).await.unwrap_err();
    assert!(matches!(
        err,
        PollError::Failure {
            state: RawState::UpstreamFailed,
            ..
        }
    ));
    assert_eq!(p.state(), PollState::Failed);
    assert_eq!(p.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn no_run_found_times_out() {
    let status = ScriptedStatus::default();
    let mut p = poller("etl.rows", &config(60, 300));
    let started = tokio::time::Instant::now();

    let err = p.run(&status).await.unwrap_err();
    match err {
        PollError::Timeout {
            elapsed_secs,
            attempts,
            last_state,
            ..
        } => {
            assert_eq!(elapsed_secs, 300);
            // Checks at 0, 60, 120, 180, 240 and 300 seconds.
            assert_eq!(attempts, 6);
            assert_eq!(last_state, None);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(300) && waited < Duration::from_secs(301));
}

#[tokio::test(start_paused = true)]
async fn running_forever_times_out_with_last_state() {
    let status = ScriptedStatus::default().with("etl.rows", vec![Some(RawState::Running)]);
    let mut p = poller("etl.rows", &config(60, 90));

    let err = p.run(&status).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.to_string().contains("last state: running"));
}

#[tokio::test(start_paused = true)]
async fn max_attempts_caps_the_loop() {
    let status = ScriptedStatus::default();
    let cfg = PollerConfig {
        max_attempts: Some(3),
        ..config(60, 3600)
    };
    let mut p = poller("etl.rows", &cfg);

    let err = p.run(&status).await.unwrap_err();
    assert!(matches!(err, PollError::Timeout { attempts: 3, .. }));
    assert_eq!(status.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_waits_the_minimum_between_checks() {
    let status = ScriptedStatus::default().with("etl.rows", vec![Some(RawState::Running)]);
    let mut p = poller("etl.rows", &config(0, 10));

    let err = p.run(&status).await.unwrap_err();
    // One check per second from 0 to 10 seconds.
    assert!(matches!(err, PollError::Timeout { attempts: 11, .. }));
    assert_eq!(status.calls.load(Ordering::SeqCst), 11);
}

#[tokio::test(start_paused = true)]
async fn late_success_is_seen() {
    let status = ScriptedStatus::default().with(
        "etl.rows",
        vec![None, None, Some(RawState::Running), Some(RawState::Success)],
    );
    let mut p = poller("etl.rows", &config(60, 3600));

    assert!(p.run(&status).await.is_ok());
    assert_eq!(p.attempts(), 4);
}

#[tokio::test(start_paused = true)]
async fn backend_error_propagates_immediately() {
    let status = ScriptedStatus::default().failing("etl.rows", "connection refused");
    let mut p = poller("etl.rows", &config(60, 3600));

    let err = p.run(&status).await.unwrap_err();
    assert!(matches!(err, PollError::Status { .. }));
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(status.calls.load(Ordering::SeqCst), 1);
}

// ── ReportRun ───────────────────────────────────────────────

fn definition(tests: &[&str]) -> ReportDefinition {
    ReportDefinition {
        report_id: "rb_status_nightly".to_string(),
        title_slug: "nightly".to_string(),
        title: "Nightly".to_string(),
        description: "d".to_string(),
        owner_name: "o".to_string(),
        owner_email: "o@corp.com".to_string(),
        subscribers: vec!["o@corp.com".to_string()],
        schedule_type: ScheduleType::Daily,
        schedule_time_local: Some("09:00".to_string()),
        schedule_weekday: None,
        schedule_timezone: "UTC".to_string(),
        schedule_cron: Some("0 9 * * *".to_string()),
        tests: tests.iter().map(|t| UnitRef::parse(t).unwrap()).collect(),
    }
}

fn finished_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

#[tokio::test(start_paused = true)]
async fn run_waits_for_every_poller() {
    let status = Arc::new(
        ScriptedStatus::default()
            .with("etl.rows", vec![Some(RawState::Failed)])
            .with(
                "etl.fresh",
                vec![Some(RawState::Running), Some(RawState::Running), Some(RawState::Success)],
            ),
    );
    let run = ReportRun::new(status.clone(), &ReportsConfig::default(), &config(60, 3600));
    let def = definition(&["etl.rows", "etl.fresh"]);

    let verdicts = run.collect_verdicts(&def).await;
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[0].state, PollState::Failed);
    // The sibling kept polling after the first failure.
    assert_eq!(verdicts[1].state, PollState::Succeeded);
    assert_eq!(status.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn execute_reports_first_failure() {
    let status = Arc::new(
        ScriptedStatus::default()
            .with("etl.rows", vec![Some(RawState::Success)])
            .with("etl.fresh", vec![Some(RawState::Shutdown)]),
    );
    let run = ReportRun::new(status, &ReportsConfig::default(), &config(60, 3600));
    let def = definition(&["etl.rows", "etl.fresh"]);

    assert_eq!(run.poller_names(&def), vec!["test_etl.rows", "test_etl.fresh"]);
    let outcome = run.execute(&def, finished_at()).await;
    assert_eq!(outcome.updated_at, finished_at());
    assert!(!outcome.passed);
    assert_eq!(
        outcome.failure_detail.as_deref(),
        Some("test_etl.fresh finished in state shutdown")
    );
}

#[tokio::test(start_paused = true)]
async fn execute_passes_when_all_succeed() {
    let status = Arc::new(
        ScriptedStatus::default()
            .with("etl.rows", vec![None, Some(RawState::Success)])
            .with("etl.fresh", vec![Some(RawState::Skipped)]),
    );
    let reports = ReportsConfig {
        auxiliary_failures: AuxiliaryPolicy::Fail,
        ..ReportsConfig::default()
    };
    let run = ReportRun::new(status, &reports, &config(30, 600));

    let outcome = run
        .execute(&definition(&["etl.rows", "etl.fresh"]), finished_at())
        .await;
    assert!(outcome.passed);
    assert_eq!(outcome.status(), "Passed");
}

#[tokio::test(start_paused = true)]
async fn manual_trigger_carries_run_id() {
    let status = Arc::new(ScriptedStatus::default().with("etl.rows", vec![Some(RawState::Success)]));
    let run = ReportRun::new(status, &ReportsConfig::default(), &config(60, 600));
    let mut def = definition(&["etl.rows"]);
    def.schedule_type = ScheduleType::Manual;
    def.schedule_time_local = None;
    def.schedule_cron = None;

    let manual = run.trigger(&def, finished_at()).await;
    assert_eq!(manual.run_id, "rb_status_manual__2024-01-10T12:00:00.000000+00:00");
    assert!(manual.outcome.passed);
    assert_eq!(manual.outcome.updated_at, finished_at());
}
