//! Scheduler interface and the critical-path implementation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{Calendar, CalendarError, WorkdayFilter};
use crate::config::SchedulerConfig;
use crate::critical_path::analyze;
use crate::graph::{GraphError, TaskGraph};
use crate::models::{Plan, PlannedTask, Task, Team};
use crate::{log_changes, log_debug};

use super::leveling::level;
use super::state::LevelingState;

/// Errors that can occur during scheduling.
///
/// Every variant is raised before a plan exists; no partial plan is ever
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Duplicate task name: {0:?}")]
    DuplicateTask(String),
    #[error("Cyclic dependency involving task {task:?}: {}", .cycle.join(" -> "))]
    CyclicDependency { task: String, cycle: Vec<String> },
    #[error("Invalid team {name:?}: size must be positive, got {size}")]
    InvalidTeam { name: String, size: i64 },
    #[error("Task {task:?} depends on unknown task {dependency:?}")]
    UnknownDependency { task: String, dependency: String },
    #[error("Invalid task {task:?}: {reason}")]
    InvalidTask { task: String, reason: String },
    #[error("Plan exceeds horizon of {max_days} working days; unfinished: {unfinished:?}")]
    HorizonExceeded {
        max_days: u32,
        unfinished: Vec<String>,
    },
    #[error("Failed to schedule tasks: {0:?}")]
    FailedToSchedule(Vec<String>),
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),
}

impl From<GraphError> for ScheduleError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InvalidTask { task, reason } => ScheduleError::InvalidTask { task, reason },
            GraphError::DuplicateTask(name) => ScheduleError::DuplicateTask(name),
            GraphError::UnknownDependency { task, dependency } => {
                ScheduleError::UnknownDependency { task, dependency }
            }
            GraphError::CyclicDependency { task, cycle } => {
                ScheduleError::CyclicDependency { task, cycle }
            }
        }
    }
}

/// A strategy that turns tasks and a team into a plan.
pub trait Scheduler {
    fn schedule(
        &self,
        tasks: &[Task],
        team: &Team,
        start_date: NaiveDate,
        workdays: &dyn WorkdayFilter,
    ) -> Result<Plan, ScheduleError>;
}

/// Resource-leveling scheduler that gives first pick to the tasks with the
/// longest minimum-duration chain ending at them.
#[derive(Clone, Debug, Default)]
pub struct CriticalPathScheduler {
    config: SchedulerConfig,
}

impl CriticalPathScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Scheduler for CriticalPathScheduler {
    fn schedule(
        &self,
        tasks: &[Task],
        team: &Team,
        start_date: NaiveDate,
        workdays: &dyn WorkdayFilter,
    ) -> Result<Plan, ScheduleError> {
        let verbosity = self.config.verbosity;

        if team.size == 0 {
            return Err(ScheduleError::InvalidTeam {
                name: team.name.clone(),
                size: 0,
            });
        }

        let graph = TaskGraph::new(tasks)?;
        if graph.is_empty() {
            return Ok(Plan {
                tasks: Vec::new(),
                start_date,
                team: team.clone(),
                working_dates: Vec::new(),
            });
        }

        // An unusable calendar fails before any allocation
        let calendar = Calendar::new(start_date, workdays);
        calendar.first_workday()?;

        let analysis = analyze(&graph, team.size, verbosity);
        log_debug!(
            verbosity,
            "Critical path length: {} working days",
            analysis.critical_path_length
        );

        let state = level(&graph, &analysis, team.size, &self.config)?;
        let plan = assemble_plan(tasks, team, &calendar, state)?;

        log_changes!(
            verbosity,
            "Planned {} task(s) over {} working day(s), {} to {}",
            plan.tasks.len(),
            plan.makespan(),
            plan.working_dates.first().copied().unwrap_or(start_date),
            plan.working_dates.last().copied().unwrap_or(start_date)
        );
        Ok(plan)
    }
}

/// Package per-task records in submission order with their calendar dates.
fn assemble_plan(
    tasks: &[Task],
    team: &Team,
    calendar: &Calendar<'_>,
    state: LevelingState,
) -> Result<Plan, ScheduleError> {
    let makespan = state.last_day().map_or(0, |d| d + 1);
    let working_dates = calendar.dates(makespan)?;

    let mut planned = Vec::with_capacity(tasks.len());
    let mut unfinished = Vec::new();
    for (task, record) in tasks.iter().zip(state.into_records()) {
        let Some((start_offset, end_offset, daily_allocation)) = record else {
            unfinished.push(task.name.clone());
            continue;
        };
        let dated_allocation = daily_allocation
            .iter()
            .map(|(&day, &workers)| (working_dates[day as usize], workers))
            .collect();
        planned.push(PlannedTask {
            task: task.clone(),
            start_offset,
            end_offset,
            start_date: working_dates[start_offset as usize],
            end_date: working_dates[end_offset as usize],
            daily_allocation,
            dated_allocation,
        });
    }
    if !unfinished.is_empty() {
        return Err(ScheduleError::FailedToSchedule(unfinished));
    }

    Ok(Plan {
        tasks: planned,
        start_date: calendar.start(),
        team: team.clone(),
        working_dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Weekdays;
    use std::collections::BTreeMap;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn run(tasks: &[Task], team_size: u32) -> Result<Plan, ScheduleError> {
        CriticalPathScheduler::default().schedule(
            tasks,
            &Team::new("Engineering Team", team_size),
            d(2025, 1, 1),
            &Weekdays,
        )
    }

    #[test]
    fn test_invalid_team() {
        let err = run(&[Task::new("a", 1, 1)], 0).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidTeam {
                name: "Engineering Team".to_string(),
                size: 0,
            }
        );
    }

    #[test]
    fn test_empty_plan() {
        let plan = run(&[], 3).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.start_date(), d(2025, 1, 1));
        assert_eq!(plan.makespan(), 0);
    }

    #[test]
    fn test_graph_errors_surface() {
        let dup = vec![Task::new("X", 1, 1), Task::new("X", 2, 1)];
        assert_eq!(
            run(&dup, 1).unwrap_err(),
            ScheduleError::DuplicateTask("X".to_string())
        );

        let cyclic = vec![
            Task::new("A", 1, 1).with_dependencies(["B"]),
            Task::new("B", 1, 1).with_dependencies(["A"]),
        ];
        assert!(matches!(
            run(&cyclic, 1),
            Err(ScheduleError::CyclicDependency { .. })
        ));

        let unknown = vec![Task::new("A", 1, 1).with_dependencies(["Z"])];
        assert!(matches!(
            run(&unknown, 1),
            Err(ScheduleError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_dependent_starts_after_dependency() {
        let tasks = vec![
            Task::new("A", 3, 2),
            Task::new("B", 2, 1).with_dependencies(["A"]),
        ];
        let plan = run(&tasks, 3).unwrap();

        let a = &plan.tasks()[0];
        assert_eq!(a.name(), "A");
        assert_eq!(a.start_date(), d(2025, 1, 1));
        assert_eq!(a.end_date(), d(2025, 1, 2));
        assert_eq!(
            a.dated_allocation(),
            &BTreeMap::from([(d(2025, 1, 1), 2), (d(2025, 1, 2), 1)])
        );

        let b = &plan.tasks()[1];
        assert_eq!(b.start_date(), d(2025, 1, 3));
        // 4th and 5th are a weekend
        assert_eq!(b.end_date(), d(2025, 1, 6));
        assert_eq!(b.start_offset, 2);
        assert_eq!(b.end_offset, 3);
    }

    #[test]
    fn test_plan_keeps_submission_order() {
        let tasks = vec![
            Task::new("short", 1, 1),
            Task::new("long", 9, 1),
        ];
        let plan = run(&tasks, 1).unwrap();
        let names: Vec<&str> = plan.tasks().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["short", "long"]);
        // long has priority
        assert_eq!(plan.task("long").unwrap().start_offset, 0);
        assert_eq!(plan.task("short").unwrap().start_offset, 9);
    }

    #[test]
    fn test_never_working_calendar_fails_before_leveling() {
        let never = |_: NaiveDate| false;
        let scheduler = CriticalPathScheduler::new(SchedulerConfig::default().with_max_days(2));
        let err = scheduler
            .schedule(
                &[Task::new("a", 10, 1)],
                &Team::new("Engineering Team", 1),
                d(2025, 1, 1),
                &never,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::Calendar(CalendarError::NoWorkingDay { .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ScheduleError::CyclicDependency {
            task: "A".to_string(),
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic dependency involving task \"A\": A -> B -> A"
        );
    }
}
