//! Resource-leveling scheduler.
//!
//! Validates the task graph, ranks tasks by critical path distance and
//! assigns workers day by day until every task's effort is allocated.

mod core;
mod leveling;
mod state;

pub use self::core::{CriticalPathScheduler, ScheduleError, Scheduler};
pub use self::state::TaskState;
