// src/dag/snapshot.rs

//! Per-run copy of a compiled graph.

use crate::dag::graph::DependencyGraph;

/// A private, destructively consumed copy of a compiled [`DependencyGraph`].
///
/// Each execution (linear or concurrent) takes its own snapshot, so releasing
/// edges here never touches the cached compiled graph or any other run.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    graph: DependencyGraph,
    released: usize,
}

impl RunSnapshot {
    pub(crate) fn new(graph: DependencyGraph) -> Self {
        Self { graph, released: 0 }
    }

    /// Tasks that are ready before anything has completed.
    pub fn initial_ready(&self) -> Vec<usize> {
        self.graph.ready_tasks()
    }

    /// Mark `completed` as done and return the tasks it unlocked.
    pub fn release(&mut self, completed: usize) -> Vec<usize> {
        self.released += 1;
        self.graph.release(completed)
    }

    /// Number of tasks released so far.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Whether every task of the graph has been released.
    pub fn is_exhausted(&self) -> bool {
        self.released == self.graph.task_count()
    }

    pub fn remaining_edges(&self) -> usize {
        self.graph.edge_count()
    }
}
