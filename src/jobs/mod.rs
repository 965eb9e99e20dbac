//! Population-wide batch jobs, run serially (admin dashboard load or daemon tick).

mod aggregate;
mod triggers;

pub use aggregate::{AggregateStats, AggregateStatsJob};
pub use triggers::{Trigger, TriggerDetector, TriggerRunReport, TriggerType};
