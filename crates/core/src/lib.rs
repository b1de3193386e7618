pub mod config;
pub mod error;
pub mod report;
pub mod verdict;

pub use config::{
    AuxiliaryPolicy, Config, NotifyConfig, PollerConfig, ReportsConfig, MIN_POLL_INTERVAL_SECS,
};
pub use error::*;
pub use report::*;
pub use verdict::*;
