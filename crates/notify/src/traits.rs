//! Notifier trait definition and shared error types.

use std::collections::HashMap;

/// Errors that can occur while rendering or delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Failed to read template {path}: {source}")]
    TemplateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    /// Addresses to deliver to.
    pub recipients: Vec<String>,
    /// The rendered subject line.
    pub subject: String,
    /// The rendered (HTML) body.
    pub body: String,
    /// Additional metadata (e.g. report id, status).
    pub metadata: HashMap<String, String>,
}

/// Trait for notification channel implementations.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification through this channel.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g. "smtp").
    fn channel_name(&self) -> &str;
}

/// Result of dispatching a notification to a single channel.
#[derive(Debug)]
pub struct DispatchResult {
    pub channel: String,
    pub report_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}
