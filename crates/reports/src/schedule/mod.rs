//! Schedule compilation: daily/weekly/custom/manual descriptions to UTC cron.
//!
//! Weekdays on report fields use 0 = Monday .. 6 = Sunday. The emitted cron
//! weekday field uses cron's own numbering (0 = Sunday) because the cron
//! string is consumed verbatim by the external scheduler.

mod compiler;
pub(crate) mod cron;

#[cfg(test)]
mod tests;

pub use self::compiler::{
    compile_schedule, parse_time, parse_timezone, weekday_from_index, weekday_index,
    CompiledSchedule, ScheduleInput,
};
pub use self::cron::{check_cron, describe_cron, format_cron};
