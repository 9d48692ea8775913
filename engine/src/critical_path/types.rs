//! Types for critical path analysis.

use crate::interner::TaskIdx;

/// Per-task path metrics for one scheduling run.
///
/// All vectors are indexed by task submission index. Durations and
/// distances are in working days.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CriticalPathAnalysis {
    /// Minimum duration of each task given the team size.
    pub durations: Vec<u32>,
    /// Longest chain of minimum durations ending at each task, inclusive.
    pub distances: Vec<u64>,
    /// Longest chain of minimum durations starting at each task, inclusive.
    pub tail_distances: Vec<u64>,
    /// Maximum distance over all sink tasks.
    pub critical_path_length: u64,
    /// Tasks with no dependents, in name order.
    pub sinks: Vec<TaskIdx>,
    /// One longest chain, from a source task to a sink task.
    pub critical_path: Vec<TaskIdx>,
    /// Tasks in scheduling priority order.
    pub priority_order: Vec<TaskIdx>,
}

impl CriticalPathAnalysis {
    #[inline]
    pub fn duration(&self, task: TaskIdx) -> u32 {
        self.durations[task as usize]
    }

    #[inline]
    pub fn distance(&self, task: TaskIdx) -> u64 {
        self.distances[task as usize]
    }

    /// Working days a task can slip without lengthening the critical path.
    pub fn slack(&self, task: TaskIdx) -> u64 {
        let idx = task as usize;
        let through = self.distances[idx] + self.tail_distances[idx] - self.durations[idx] as u64;
        self.critical_path_length - through
    }

    pub fn is_critical(&self, task: TaskIdx) -> bool {
        self.slack(task) == 0
    }
}
