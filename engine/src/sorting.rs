//! Priority ordering for resource contention.
//!
//! Tasks with a longer dependency chain ending at them go first; names break
//! ties so runs are reproducible.

use std::cmp::Ordering;

use crate::interner::TaskIdx;

/// Sort key for task prioritization.
///
/// Implements `Ord` so tasks can be sorted (lower = scheduled first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityKey<'a> {
    pub distance: u64,
    pub name: &'a str,
    pub task: TaskIdx,
}

impl Ord for PriorityKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| self.name.cmp(other.name))
    }
}

impl PartialOrd for PriorityKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort tasks by priority: distance descending, then name ascending.
pub fn sort_by_priority(mut keys: Vec<PriorityKey<'_>>) -> Vec<TaskIdx> {
    keys.sort();
    keys.into_iter().map(|k| k.task).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(distance: u64, name: &str, task: TaskIdx) -> PriorityKey<'_> {
        PriorityKey {
            distance,
            name,
            task,
        }
    }

    #[test]
    fn test_longer_distance_first() {
        let order = sort_by_priority(vec![key(2, "a", 0), key(7, "b", 1), key(4, "c", 2)]);
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let order = sort_by_priority(vec![key(5, "b", 0), key(5, "a", 1), key(5, "B", 2)]);
        // Byte order: uppercase before lowercase
        assert_eq!(order, vec![2, 1, 0]);
    }
}
