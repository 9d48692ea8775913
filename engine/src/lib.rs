//! Critical-path resource-leveling planner.
//!
//! Turns a dependency graph of tasks, a fixed-size team and a start date into
//! a day-by-day plan. Tasks on or near the critical path get first pick of
//! workers; leftover capacity flows to whatever else is ready.
//!
//! ```
//! use chrono::NaiveDate;
//! use ganttplan::{schedule, Task, Team};
//!
//! let tasks = vec![
//!     Task::new("design", 4, 2),
//!     Task::new("build", 3, 1).with_dependencies(["design"]),
//! ];
//! let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let plan = schedule(&tasks, &Team::new("core", 2), start, None).unwrap();
//! assert_eq!(plan.task("build").unwrap().start_offset, 2);
//! assert_eq!(plan.makespan(), 5);
//! ```

use chrono::NaiveDate;

pub mod calendar;
mod config;
pub mod critical_path;
pub mod graph;
mod interner;
pub mod logging;
mod models;
pub mod render;
pub mod scheduler;
pub mod sorting;

#[cfg(feature = "python")]
mod python;

pub use calendar::{Calendar, CalendarError, Holidays, Weekdays, WorkdayFilter};
pub use config::SchedulerConfig;
pub use critical_path::{analyze, CriticalPathAnalysis};
pub use graph::{GraphError, TaskGraph};
pub use interner::TaskIdx;
pub use models::{Plan, PlannedTask, Task, Team};
pub use scheduler::{CriticalPathScheduler, ScheduleError, Scheduler, TaskState};

/// Plan `tasks` for `team` with the critical-path scheduler.
///
/// `workdays` defaults to Monday through Friday.
///
/// # Errors
/// * `InvalidTeam` if the team has no workers
/// * `InvalidTask`, `DuplicateTask`, `UnknownDependency` or
///   `CyclicDependency` if the task set is malformed
pub fn schedule(
    tasks: &[Task],
    team: &Team,
    start_date: NaiveDate,
    workdays: Option<&dyn WorkdayFilter>,
) -> Result<Plan, ScheduleError> {
    CriticalPathScheduler::default().schedule(
        tasks,
        team,
        start_date,
        workdays.unwrap_or(&Weekdays),
    )
}
