//! Per-run leveling state.

use std::collections::BTreeMap;

use crate::graph::TaskGraph;
use crate::interner::TaskIdx;

/// Lifecycle of a task during leveling. Tasks only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// At least one dependency has not finished before the current day.
    Blocked,
    /// Dependencies done, no worker assigned yet.
    Ready,
    /// Has received workers on some day, effort remaining.
    InProgress,
    /// All effort allocated.
    Done,
}

impl TaskState {
    /// Whether the task may receive workers.
    pub fn is_schedulable(self) -> bool {
        matches!(self, TaskState::Ready | TaskState::InProgress)
    }
}

/// Working copy of remaining effort and allocations for one run.
///
/// The input tasks are never touched; everything mutable lives here.
#[derive(Clone, Debug)]
pub struct LevelingState {
    remaining: Vec<u32>,
    start_offset: Vec<Option<u32>>,
    end_offset: Vec<Option<u32>>,
    allocations: Vec<BTreeMap<u32, u32>>,
    unfinished: usize,
}

impl LevelingState {
    pub fn new(graph: &TaskGraph<'_>) -> Self {
        let n = graph.len();
        Self {
            remaining: graph.tasks().iter().map(|t| t.effort).collect(),
            start_offset: vec![None; n],
            end_offset: vec![None; n],
            allocations: vec![BTreeMap::new(); n],
            unfinished: n,
        }
    }

    /// State of a task at the start of working day `day`.
    ///
    /// A dependency finishing on `day` itself still blocks its dependents
    /// until the following day.
    pub fn state_of(&self, graph: &TaskGraph<'_>, task: TaskIdx, day: u32) -> TaskState {
        let idx = task as usize;
        if self.remaining[idx] == 0 {
            return TaskState::Done;
        }
        let blocked = graph
            .dependencies(task)
            .iter()
            .any(|&dep| !matches!(self.end_offset[dep as usize], Some(end) if end < day));
        if blocked {
            TaskState::Blocked
        } else if self.start_offset[idx].is_some() {
            TaskState::InProgress
        } else {
            TaskState::Ready
        }
    }

    #[inline]
    pub fn remaining(&self, task: TaskIdx) -> u32 {
        self.remaining[task as usize]
    }

    /// Assign `workers` to a task on `day`. Returns true when the task
    /// finishes with this allocation.
    pub fn allocate(&mut self, task: TaskIdx, day: u32, workers: u32) -> bool {
        let idx = task as usize;
        if workers == 0 {
            return false;
        }
        debug_assert!(workers <= self.remaining[idx]);
        *self.allocations[idx].entry(day).or_insert(0) += workers;
        self.remaining[idx] -= workers;
        self.start_offset[idx].get_or_insert(day);
        if self.remaining[idx] == 0 {
            self.end_offset[idx] = Some(day);
            self.unfinished -= 1;
            return true;
        }
        false
    }

    pub fn is_finished(&self) -> bool {
        self.unfinished == 0
    }

    /// Indices of tasks with effort remaining.
    pub fn unfinished(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        self.remaining
            .iter()
            .enumerate()
            .filter(|(_, &r)| r > 0)
            .map(|(i, _)| i as TaskIdx)
    }

    /// Largest end offset over all finished tasks.
    pub fn last_day(&self) -> Option<u32> {
        self.end_offset.iter().flatten().copied().max()
    }

    /// Consume the state into per-task (start, end, allocation) records.
    ///
    /// Returns `None` for any task that never finished.
    pub fn into_records(self) -> Vec<Option<(u32, u32, BTreeMap<u32, u32>)>> {
        self.start_offset
            .into_iter()
            .zip(self.end_offset)
            .zip(self.allocations)
            .map(|((start, end), alloc)| match (start, end) {
                (Some(s), Some(e)) => Some((s, e, alloc)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    #[test]
    fn test_state_transitions() {
        let tasks = vec![
            Task::new("a", 2, 1),
            Task::new("b", 1, 1).with_dependencies(["a"]),
        ];
        let graph = TaskGraph::new(&tasks).unwrap();
        let mut state = LevelingState::new(&graph);

        assert_eq!(state.state_of(&graph, 0, 0), TaskState::Ready);
        assert_eq!(state.state_of(&graph, 1, 0), TaskState::Blocked);

        assert!(!state.allocate(0, 0, 1));
        assert_eq!(state.state_of(&graph, 0, 1), TaskState::InProgress);

        assert!(state.allocate(0, 1, 1));
        assert_eq!(state.state_of(&graph, 0, 1), TaskState::Done);
        // Same-day completion still blocks the dependent
        assert_eq!(state.state_of(&graph, 1, 1), TaskState::Blocked);
        assert_eq!(state.state_of(&graph, 1, 2), TaskState::Ready);
        assert!(!state.is_finished());

        assert!(state.allocate(1, 2, 1));
        assert!(state.is_finished());
        assert_eq!(state.last_day(), Some(2));
    }

    #[test]
    fn test_zero_allocation_is_noop() {
        let tasks = vec![Task::new("a", 2, 1)];
        let graph = TaskGraph::new(&tasks).unwrap();
        let mut state = LevelingState::new(&graph);
        assert!(!state.allocate(0, 0, 0));
        assert_eq!(state.state_of(&graph, 0, 1), TaskState::Ready);
        assert_eq!(state.remaining(0), 2);
    }

    #[test]
    fn test_into_records() {
        let tasks = vec![Task::new("a", 3, 2), Task::new("b", 1, 1)];
        let graph = TaskGraph::new(&tasks).unwrap();
        let mut state = LevelingState::new(&graph);
        state.allocate(0, 0, 2);
        state.allocate(0, 1, 1);

        let records = state.into_records();
        let (start, end, alloc) = records[0].clone().unwrap();
        assert_eq!((start, end), (0, 1));
        assert_eq!(alloc, BTreeMap::from([(0, 2), (1, 1)]));
        assert!(records[1].is_none());
    }
}
