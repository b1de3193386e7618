use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32_opt(profile: &str, key: &str) -> Option<u32> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub reports: ReportsConfig,
    pub poller: PollerConfig,
    pub notify: NotifyConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `RB_STATUS_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("RB_STATUS_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            reports: ReportsConfig::from_env_profiled(p),
            poller: PollerConfig::from_env_profiled(p),
            notify: NotifyConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  reports:  report_prefix={}, test_prefix={}, auxiliary_failures={}",
            self.reports.report_prefix,
            self.reports.test_prefix,
            self.reports.auxiliary_failures
        );
        tracing::info!(
            "  poller:   interval={}s, timeout={}s, max_attempts={}",
            self.poller.interval_secs,
            self.poller.timeout_secs,
            self.poller
                .max_attempts
                .map(|n| n.to_string())
                .unwrap_or_else(|| "(unbounded)".to_string())
        );
        tracing::info!(
            "  notify:   template={}",
            self.notify
                .template_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: String::new(),
            reports: ReportsConfig::default(),
            poller: PollerConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

// ── Reports ───────────────────────────────────────────────────

/// Whether failures of auxiliary (non-test-prefixed) checks affect the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuxiliaryPolicy {
    /// Auxiliary checks never flip `passed`.
    #[default]
    Ignore,
    /// Any failed auxiliary check fails the report.
    Fail,
}

impl fmt::Display for AuxiliaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxiliaryPolicy::Ignore => write!(f, "ignore"),
            AuxiliaryPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for AuxiliaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(AuxiliaryPolicy::Ignore),
            "fail" => Ok(AuxiliaryPolicy::Fail),
            other => Err(format!("unknown auxiliary policy: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Prepended to the title slug to form a new report's id.
    pub report_prefix: String,
    /// Poller names starting with this prefix count as tests.
    pub test_prefix: String,
    pub auxiliary_failures: AuxiliaryPolicy,
    /// Base for the details link in notifications.
    pub details_base_url: String,
}

impl ReportsConfig {
    fn from_env_profiled(p: &str) -> Self {
        let auxiliary_failures = profiled_env_opt(p, "AUXILIARY_FAILURES")
            .and_then(|v| match v.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring AUXILIARY_FAILURES");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            report_prefix: profiled_env_or(p, "REPORT_PREFIX", "rb_status_"),
            test_prefix: profiled_env_or(p, "TEST_PREFIX", "test_"),
            auxiliary_failures,
            details_base_url: profiled_env_or(p, "DETAILS_BASE_URL", "/rb_status"),
        }
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            report_prefix: "rb_status_".to_string(),
            test_prefix: "test_".to_string(),
            auxiliary_failures: AuxiliaryPolicy::Ignore,
            details_base_url: "/rb_status".to_string(),
        }
    }
}

// ── Poller ────────────────────────────────────────────────────

/// Smallest pause between two status checks.
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Pause between two status checks. Raised to
    /// [`MIN_POLL_INTERVAL_SECS`] when lower.
    pub interval_secs: u64,
    /// Wall-clock budget per check before it is declared timed out.
    pub timeout_secs: u64,
    /// Optional cap on status checks, applied together with the timeout.
    pub max_attempts: Option<u32>,
}

impl PollerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let mut interval_secs = profiled_env_u64(p, "POLL_INTERVAL_SECS", 60);
        if interval_secs < MIN_POLL_INTERVAL_SECS {
            tracing::warn!(
                interval_secs,
                min = MIN_POLL_INTERVAL_SECS,
                "POLL_INTERVAL_SECS too small, using minimum"
            );
            interval_secs = MIN_POLL_INTERVAL_SECS;
        }
        Self {
            interval_secs,
            timeout_secs: profiled_env_u64(p, "POLL_TIMEOUT_SECS", 6 * 60 * 60),
            max_attempts: profiled_env_u32_opt(p, "POLL_MAX_ATTEMPTS"),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            timeout_secs: 6 * 60 * 60,
            max_attempts: None,
        }
    }
}

// ── Notify ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Body template file; the built-in template is used when unset.
    pub template_path: Option<PathBuf>,
}

impl NotifyConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            template_path: profiled_env_opt(p, "EMAIL_TEMPLATE_PATH").map(PathBuf::from),
        }
    }
}
