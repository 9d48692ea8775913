//! Task name interning for index-based graph algorithms.
//!
//! Converts task names to dense integer IDs so the graph, critical path and
//! leveling passes can work over plain vectors.

use rustc_hash::FxHashMap;

/// Interned task ID (u32 for compact storage and fast hashing).
pub type TaskIdx = u32;

/// Bidirectional mapping between task names and dense integer IDs.
///
/// IDs are assigned in insertion order, so `name(i)` is the name of the
/// i-th task submitted.
#[derive(Debug, Clone, Default)]
pub struct TaskNameIndex {
    to_int: FxHashMap<String, TaskIdx>,
    from_int: Vec<String>,
}

impl TaskNameIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_int: Vec::with_capacity(capacity),
        }
    }

    /// Register a new name.
    ///
    /// Returns `None` if the name is already registered; names are never
    /// merged.
    pub fn insert(&mut self, name: &str) -> Option<TaskIdx> {
        if self.to_int.contains_key(name) {
            return None;
        }
        let id = self.from_int.len() as TaskIdx;
        self.from_int.push(name.to_string());
        self.to_int.insert(name.to_string(), id);
        Some(id)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<TaskIdx> {
        self.to_int.get(name).copied()
    }

    /// Get the name for an integer ID.
    ///
    /// Panics if `id` was not handed out by this index.
    #[inline]
    pub fn name(&self, id: TaskIdx) -> &str {
        &self.from_int[id as usize]
    }

    pub fn len(&self) -> usize {
        self.from_int.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_int.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = TaskNameIndex::with_capacity(4);

        let a = index.insert("task_a").unwrap();
        let b = index.insert("task_b").unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(index.name(a), "task_a");
        assert_eq!(index.get("task_b"), Some(b));
        assert_eq!(index.get("nonexistent"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut index = TaskNameIndex::default();
        assert!(index.insert("X").is_some());
        assert!(index.insert("X").is_none());
        // Case-sensitive
        assert!(index.insert("x").is_some());
        assert_eq!(index.len(), 2);
    }
}
