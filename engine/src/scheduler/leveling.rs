//! Day-by-day resource leveling.

use crate::config::SchedulerConfig;
use crate::critical_path::CriticalPathAnalysis;
use crate::graph::TaskGraph;
use crate::{log_changes, log_checks, log_debug};

use super::core::ScheduleError;
use super::state::{LevelingState, TaskState};

/// Greedily assign workers to tasks, one working day at a time.
///
/// Each day, schedulable tasks are visited in priority order and take
/// `min(capacity left today, parallelization factor, effort remaining)`
/// workers.
pub fn level(
    graph: &TaskGraph<'_>,
    analysis: &CriticalPathAnalysis,
    team_size: u32,
    config: &SchedulerConfig,
) -> Result<LevelingState, ScheduleError> {
    let verbosity = config.verbosity;
    let mut state = LevelingState::new(graph);

    // Every day assigns at least one worker-day, so total effort bounds the loop
    let max_iterations: u64 = graph.tasks().iter().map(|t| t.effort as u64).sum();

    let mut day: u32 = 0;
    for _iteration in 0..max_iterations {
        if state.is_finished() {
            break;
        }
        if let Some(max_days) = config.max_days {
            if day >= max_days {
                return Err(ScheduleError::HorizonExceeded {
                    max_days,
                    unfinished: unfinished_names(graph, &state),
                });
            }
        }

        log_changes!(verbosity, "Day {}", day);

        let mut capacity = team_size;
        for &task in &analysis.priority_order {
            let task_state = state.state_of(graph, task, day);
            if task_state == TaskState::Blocked {
                log_checks!(verbosity, "  Skipping {}: blocked", graph.name(task));
                continue;
            }
            if !task_state.is_schedulable() {
                continue;
            }

            if capacity == 0 {
                log_checks!(verbosity, "  Skipping {}: no capacity left", graph.name(task));
                continue;
            }

            let workers = capacity
                .min(graph.task(task).parallelization_factor)
                .min(state.remaining(task));
            let finished = state.allocate(task, day, workers);
            capacity -= workers;

            log_changes!(
                verbosity,
                "  Assigned {} worker(s) to {} ({} left)",
                workers,
                graph.name(task),
                state.remaining(task)
            );
            if finished {
                log_changes!(verbosity, "  Finished {} on day {}", graph.name(task), day);
            }
        }

        log_debug!(
            verbosity,
            "  Utilization: {}/{}",
            team_size - capacity,
            team_size
        );
        day += 1;
    }

    if !state.is_finished() {
        return Err(ScheduleError::FailedToSchedule(unfinished_names(
            graph, &state,
        )));
    }
    Ok(state)
}

fn unfinished_names(graph: &TaskGraph<'_>, state: &LevelingState) -> Vec<String> {
    let mut names: Vec<String> = state
        .unfinished()
        .map(|idx| graph.name(idx).to_string())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical_path::analyze;
    use crate::models::Task;
    use std::collections::BTreeMap;

    fn run(
        tasks: &[Task],
        team_size: u32,
        config: &SchedulerConfig,
    ) -> Result<LevelingState, ScheduleError> {
        let graph = TaskGraph::new(tasks).unwrap();
        let analysis = analyze(&graph, team_size, 0);
        level(&graph, &analysis, team_size, config)
    }

    #[test]
    fn test_single_task_uses_parallelism() {
        let tasks = vec![Task::new("a", 6, 2)];
        let state = run(&tasks, 2, &SchedulerConfig::default()).unwrap();
        let records = state.into_records();
        let (start, end, alloc) = records[0].clone().unwrap();
        assert_eq!((start, end), (0, 2));
        assert_eq!(alloc, BTreeMap::from([(0, 2), (1, 2), (2, 2)]));
    }

    #[test]
    fn test_leftover_capacity_goes_to_lower_priority() {
        // a is longer so it gets first pick, b absorbs the remaining worker
        let tasks = vec![Task::new("a", 4, 2), Task::new("b", 1, 3)];
        let state = run(&tasks, 3, &SchedulerConfig::default()).unwrap();
        let records = state.into_records();
        assert_eq!(records[0].clone().unwrap().2, BTreeMap::from([(0, 2), (1, 2)]));
        assert_eq!(records[1].clone().unwrap().2, BTreeMap::from([(0, 1)]));
    }

    #[test]
    fn test_horizon_exceeded() {
        let tasks = vec![Task::new("slow", 10, 1), Task::new("quick", 1, 1)];
        let config = SchedulerConfig::default().with_max_days(5);
        match run(&tasks, 1, &config) {
            Err(ScheduleError::HorizonExceeded {
                max_days,
                unfinished,
            }) => {
                assert_eq!(max_days, 5);
                assert_eq!(unfinished, vec!["quick", "slow"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_horizon_exactly_fits() {
        let tasks = vec![Task::new("a", 5, 1)];
        let config = SchedulerConfig::default().with_max_days(5);
        assert!(run(&tasks, 1, &config).is_ok());
    }
}
