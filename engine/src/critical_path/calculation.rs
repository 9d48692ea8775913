//! Critical path calculation using forward and backward passes.

use crate::graph::TaskGraph;
use crate::interner::TaskIdx;
use crate::log_debug;
use crate::sorting::{sort_by_priority, PriorityKey};

use super::types::CriticalPathAnalysis;

/// Analyze the graph for a team of `team_size` workers.
///
/// The forward pass computes, in topological order,
/// `distance(t) = duration(t) + max(distance(d) for d in dependencies(t))`.
/// The backward pass computes the same quantity towards the sinks, which
/// gives each task's slack.
pub fn analyze(graph: &TaskGraph<'_>, team_size: u32, verbosity: u8) -> CriticalPathAnalysis {
    let n = graph.len();
    if n == 0 {
        return CriticalPathAnalysis::default();
    }

    let durations: Vec<u32> = graph
        .tasks()
        .iter()
        .map(|task| task.optimistic_duration(team_size))
        .collect();

    // Forward pass
    let mut distances = vec![0u64; n];
    for &idx in graph.topo_order() {
        let longest_dep = graph
            .dependencies(idx)
            .iter()
            .map(|&dep| distances[dep as usize])
            .max()
            .unwrap_or(0);
        distances[idx as usize] = durations[idx as usize] as u64 + longest_dep;
    }

    // Backward pass
    let mut tail_distances = vec![0u64; n];
    for &idx in graph.topo_order().iter().rev() {
        let longest_dependent = graph
            .dependents(idx)
            .iter()
            .map(|&dep| tail_distances[dep as usize])
            .max()
            .unwrap_or(0);
        tail_distances[idx as usize] = durations[idx as usize] as u64 + longest_dependent;
    }

    let mut sinks: Vec<TaskIdx> = graph.sinks().collect();
    sinks.sort_by(|&a, &b| graph.name(a).cmp(graph.name(b)));

    let critical_path_length = sinks
        .iter()
        .map(|&s| distances[s as usize])
        .max()
        .unwrap_or(0);

    let critical_path = trace_critical_path(graph, &durations, &distances, &sinks);

    let priority_order = sort_by_priority(
        (0..n as TaskIdx)
            .map(|idx| PriorityKey {
                distance: distances[idx as usize],
                name: graph.name(idx),
                task: idx,
            })
            .collect(),
    );

    for &idx in &priority_order {
        log_debug!(
            verbosity,
            "  {}: duration={} distance={} tail={}",
            graph.name(idx),
            durations[idx as usize],
            distances[idx as usize],
            tail_distances[idx as usize]
        );
    }
    log_debug!(
        verbosity,
        "Critical path ({} days): {:?}",
        critical_path_length,
        critical_path
            .iter()
            .map(|&idx| graph.name(idx))
            .collect::<Vec<_>>()
    );

    CriticalPathAnalysis {
        durations,
        distances,
        tail_distances,
        critical_path_length,
        sinks,
        critical_path,
        priority_order,
    }
}

/// Walk back from the furthest sink along dependencies that realize its
/// distance. Ties go to the smallest name.
fn trace_critical_path(
    graph: &TaskGraph<'_>,
    durations: &[u32],
    distances: &[u64],
    sinks: &[TaskIdx],
) -> Vec<TaskIdx> {
    // `sinks` is name-sorted, so the first maximum wins ties
    let mut current = match sinks.iter().copied().reduce(|best, s| {
        if distances[s as usize] > distances[best as usize] {
            s
        } else {
            best
        }
    }) {
        Some(sink) => sink,
        None => return Vec::new(),
    };

    let mut path = vec![current];
    loop {
        let wanted = distances[current as usize] - durations[current as usize] as u64;
        if wanted == 0 {
            break;
        }
        let next = graph
            .dependencies(current)
            .iter()
            .copied()
            .filter(|&dep| distances[dep as usize] == wanted)
            .min_by(|&a, &b| graph.name(a).cmp(graph.name(b)));
        match next {
            Some(dep) => {
                path.push(dep);
                current = dep;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
