//! Task dependency graph with structural validation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;

use crate::interner::{TaskIdx, TaskNameIndex};
use crate::models::Task;

/// Structural problems found while building a task graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Invalid task {task:?}: {reason}")]
    InvalidTask { task: String, reason: String },
    #[error("Duplicate task name: {0:?}")]
    DuplicateTask(String),
    #[error("Task {task:?} depends on unknown task {dependency:?}")]
    UnknownDependency { task: String, dependency: String },
    #[error("Cyclic dependency involving task {task:?}: {}", .cycle.join(" -> "))]
    CyclicDependency { task: String, cycle: Vec<String> },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Validated dependency graph over the tasks of one scheduling run.
///
/// Tasks are addressed by their submission index. Edges point from a
/// dependent to its dependencies.
#[derive(Debug, Clone)]
pub struct TaskGraph<'a> {
    tasks: &'a [Task],
    index: TaskNameIndex,
    dependencies: Vec<Vec<TaskIdx>>,
    dependents: Vec<Vec<TaskIdx>>,
    topo_order: Vec<TaskIdx>,
}

impl<'a> TaskGraph<'a> {
    /// Build and validate the graph.
    ///
    /// Checks, in order: task attributes, name uniqueness, dependency
    /// resolution, acyclicity. The first failure is returned.
    pub fn new(tasks: &'a [Task]) -> Result<Self, GraphError> {
        for task in tasks {
            task.validate().map_err(|reason| GraphError::InvalidTask {
                task: task.name.clone(),
                reason,
            })?;
        }

        let mut index = TaskNameIndex::with_capacity(tasks.len());
        for task in tasks {
            if index.insert(&task.name).is_none() {
                return Err(GraphError::DuplicateTask(task.name.clone()));
            }
        }

        let n = tasks.len();
        let mut dependencies: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        let mut dependents: Vec<Vec<TaskIdx>> = vec![Vec::new(); n];
        // last_seen[dep] == idx once dep is recorded for task idx
        let mut last_seen: Vec<Option<usize>> = vec![None; n];
        for (idx, task) in tasks.iter().enumerate() {
            for dep_name in &task.dependencies {
                let dep = index
                    .get(dep_name)
                    .ok_or_else(|| GraphError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: dep_name.clone(),
                    })?;
                // Dependencies are a set; repeated names add no edge
                if last_seen[dep as usize] != Some(idx) {
                    last_seen[dep as usize] = Some(idx);
                    dependencies[idx].push(dep);
                    dependents[dep as usize].push(idx as TaskIdx);
                }
            }
        }

        let mut graph = Self {
            tasks,
            index,
            dependencies,
            dependents,
            topo_order: Vec::new(),
        };
        graph.check_acyclic()?;
        graph.topo_order = graph.compute_topo_order();
        Ok(graph)
    }

    /// Iterative three-color depth-first search.
    ///
    /// Roots and edges are visited in name order so the reported cycle is
    /// stable across runs.
    fn check_acyclic(&self) -> Result<(), GraphError> {
        let n = self.tasks.len();
        let mut marks = vec![Mark::Unvisited; n];

        let mut roots: Vec<TaskIdx> = (0..n as TaskIdx).collect();
        roots.sort_by(|&a, &b| self.name(a).cmp(self.name(b)));
        let sorted_deps: Vec<Vec<TaskIdx>> = self
            .dependencies
            .iter()
            .map(|deps| {
                let mut deps = deps.clone();
                deps.sort_by(|&a, &b| self.name(a).cmp(self.name(b)));
                deps
            })
            .collect();

        // Stack of (node, next edge position)
        let mut stack: Vec<(TaskIdx, usize)> = Vec::new();
        for root in roots {
            if marks[root as usize] != Mark::Unvisited {
                continue;
            }
            marks[root as usize] = Mark::InProgress;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let deps = &sorted_deps[node as usize];
                if top.1 == deps.len() {
                    marks[node as usize] = Mark::Done;
                    stack.pop();
                    continue;
                }
                let next = deps[top.1];
                top.1 += 1;
                match marks[next as usize] {
                    Mark::Unvisited => {
                        marks[next as usize] = Mark::InProgress;
                        stack.push((next, 0));
                    }
                    Mark::InProgress => {
                        return Err(self.cycle_error(&stack, next));
                    }
                    Mark::Done => {}
                }
            }
        }
        Ok(())
    }

    fn cycle_error(&self, stack: &[(TaskIdx, usize)], back_to: TaskIdx) -> GraphError {
        let start = stack
            .iter()
            .position(|&(node, _)| node == back_to)
            .unwrap_or(0);
        let mut cycle: Vec<String> = stack[start..]
            .iter()
            .map(|&(node, _)| self.name(node).to_string())
            .collect();
        cycle.push(self.name(back_to).to_string());
        GraphError::CyclicDependency {
            task: self.name(back_to).to_string(),
            cycle,
        }
    }

    /// Kahn's algorithm with a min-heap on names, dependencies first.
    fn compute_topo_order(&self) -> Vec<TaskIdx> {
        let n = self.tasks.len();
        let mut remaining: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<(&str, TaskIdx)>> = (0..n as TaskIdx)
            .filter(|&idx| remaining[idx as usize] == 0)
            .map(|idx| Reverse((self.name(idx), idx)))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse((_, idx))) = ready.pop() {
            order.push(idx);
            for &dependent in &self.dependents[idx as usize] {
                remaining[dependent as usize] -= 1;
                if remaining[dependent as usize] == 0 {
                    ready.push(Reverse((self.name(dependent), dependent)));
                }
            }
        }
        order
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    #[inline]
    pub fn task(&self, idx: TaskIdx) -> &'a Task {
        &self.tasks[idx as usize]
    }

    #[inline]
    pub fn name(&self, idx: TaskIdx) -> &str {
        self.index.name(idx)
    }

    pub fn get(&self, name: &str) -> Option<TaskIdx> {
        self.index.get(name)
    }

    /// Direct dependencies of a task.
    #[inline]
    pub fn dependencies(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.dependencies[idx as usize]
    }

    /// Tasks that directly depend on a task.
    #[inline]
    pub fn dependents(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.dependents[idx as usize]
    }

    /// Tasks ordered so every dependency precedes its dependents.
    ///
    /// Ties are broken by ascending task name.
    pub fn topo_order(&self) -> &[TaskIdx] {
        &self.topo_order
    }

    /// Tasks nothing depends on.
    pub fn sinks(&self) -> impl Iterator<Item = TaskIdx> + '_ {
        (0..self.tasks.len() as TaskIdx).filter(|&idx| self.dependents[idx as usize].is_empty())
    }
}
