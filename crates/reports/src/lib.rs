//! Report definitions: from raw form input to a persist-ready report.
//!
//! This crate provides:
//! - Local-time schedule compilation to UTC cron expressions
//! - Subscriber list normalization and email validation
//! - Registry-wide validation that collects every issue
//! - The form pipeline and the `ReportRegistry` persistence seam
//! - Identifier derivation and per-kind record purging

pub mod email;
pub mod form;
pub mod identity;
pub mod purge;
pub mod registry;
pub mod saver;
pub mod schedule;
pub mod validation;

pub use form::{compile_report, ReportForm};
pub use registry::{InMemoryRegistry, RegistryError, ReportRegistry};
pub use saver::{ReportSaver, SaveError};
pub use schedule::{compile_schedule, CompiledSchedule, ScheduleInput};
pub use validation::{ReportDraft, ReportValidator, SaveMode};
