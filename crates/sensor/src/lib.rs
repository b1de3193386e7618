//! Run-time side of status reports.
//!
//! This crate provides:
//! - `ExecutionStatus` trait for reading the latest run state of a check
//! - `CompletionPoller` state machine with a mandatory timeout budget
//! - `ReportAggregator` folding per-check verdicts into one outcome
//! - `ReportRun` driving all pollers of a report concurrently

pub mod aggregator;
pub mod error;
pub mod poller;
pub mod run;
pub mod status;

pub use aggregator::ReportAggregator;
pub use error::PollError;
pub use poller::CompletionPoller;
pub use run::{ManualRun, ReportRun};
pub use status::{ExecutionStatus, RawState, StateBucket, StatusError};
