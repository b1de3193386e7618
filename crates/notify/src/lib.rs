//! Notifications for finished report runs.
//!
//! This crate provides:
//! - `ReportNotification` payload built from a definition and its outcome
//! - Minijinja rendering of the subject and the (configurable) body template
//! - `Notifier` trait for pluggable delivery channels
//! - `Dispatcher` that renders once and delivers to every channel

pub mod dispatcher;
pub mod report;
pub mod templating;
pub mod traits;

pub use dispatcher::{DeliveryReport, Dispatcher};
pub use report::{ReportNotification, ReportParams};
pub use templating::TemplateRenderer;
pub use traits::{DispatchResult, Notification, Notifier, NotifyError};
