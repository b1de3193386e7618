//! Delivery of a finished report's notification to every channel.

use std::time::Instant;

use futures::future::join_all;

use crate::report::ReportNotification;
use crate::templating::TemplateRenderer;
use crate::traits::{DispatchResult, Notification, Notifier, NotifyError};

/// Per-channel results of one delivery.
#[derive(Debug)]
pub struct DeliveryReport {
    pub report_id: String,
    pub results: Vec<DispatchResult>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn failed_channels(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.channel.as_str())
            .collect()
    }
}

/// Renders a [`ReportNotification`] once and hands it to each channel.
pub struct Dispatcher {
    channels: Vec<Box<dyn Notifier>>,
    renderer: TemplateRenderer,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn Notifier>>, renderer: TemplateRenderer) -> Self {
        Self { channels, renderer }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.channel_name()).collect()
    }

    /// Render and send to all channels at once. A failing channel is recorded
    /// in its result and does not stop the others.
    ///
    /// # Errors
    ///
    /// Only rendering fails the whole delivery; nothing is sent then.
    pub async fn deliver(&self, payload: &ReportNotification) -> Result<DeliveryReport, NotifyError> {
        let report_id = payload.report_id.as_str();
        let mut report = DeliveryReport {
            report_id: report_id.to_string(),
            results: Vec::new(),
        };
        if payload.recipients.is_empty() {
            tracing::warn!(report_id, "no recipients, nothing sent");
            return Ok(report);
        }
        if self.channels.is_empty() {
            tracing::debug!(report_id, "no notification channels configured");
            return Ok(report);
        }

        let notification = payload.render(&self.renderer)?;
        let sends = self
            .channels
            .iter()
            .map(|channel| send_one(channel.as_ref(), report_id, &notification));
        report.results = join_all(sends).await;

        tracing::info!(
            report_id,
            status = %payload.params.status,
            recipients = payload.recipients.len(),
            failed = report.failed_channels().len(),
            "report notification dispatched"
        );
        Ok(report)
    }
}

async fn send_one(channel: &dyn Notifier, report_id: &str, notification: &Notification) -> DispatchResult {
    let start = Instant::now();
    let outcome = channel.send(notification).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let error = outcome.err().map(|e| {
        tracing::warn!(report_id, channel = channel.channel_name(), error = %e, "delivery failed");
        e.to_string()
    });
    DispatchResult {
        channel: channel.channel_name().to_string(),
        report_id: report_id.to_string(),
        success: error.is_none(),
        error,
        duration_ms,
    }
}
