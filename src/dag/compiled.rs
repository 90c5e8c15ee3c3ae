// src/dag/compiled.rs

//! Read-only view of a compiled dependency graph.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;

use crate::dag::builder::CompileStats;
use crate::dag::graph::DependencyGraph;
use crate::dag::snapshot::RunSnapshot;
use crate::types::EdgeState;

/// Result of compiling a task list and a rule list.
///
/// Holds the task list in index order, the reverse lookup, and the
/// dependency matrices. It is never mutated after compilation; executions
/// work on a [`RunSnapshot`] instead.
#[derive(Debug, Clone)]
pub struct CompiledGraph<T> {
    tasks: Vec<T>,
    index: HashMap<T, usize>,
    graph: DependencyGraph,
    stats: CompileStats,
}

impl<T> CompiledGraph<T>
where
    T: Clone + Eq + Hash + Debug,
{
    pub(crate) fn new(
        tasks: Vec<T>,
        index: HashMap<T, usize>,
        graph: DependencyGraph,
        stats: CompileStats,
    ) -> Self {
        Self {
            tasks,
            index,
            graph,
            stats,
        }
    }

    /// Counters collected while this graph was compiled.
    pub fn stats(&self) -> CompileStats {
        self.stats
    }

    /// Tasks in compile-time index order.
    pub fn tasks(&self) -> &[T] {
        &self.tasks
    }

    pub fn task(&self, index: usize) -> Option<&T> {
        self.tasks.get(index)
    }

    pub fn index_of(&self, task: &T) -> Option<usize> {
        self.index.get(task).copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Underlying index-based matrices.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Edge marker between two tasks, or `None` if either is unknown.
    pub fn edge_state(&self, predecessor: &T, successor: &T) -> Option<EdgeState> {
        let p = self.index_of(predecessor)?;
        let s = self.index_of(successor)?;
        Some(self.graph.edge_state(p, s))
    }

    /// Whether a committed edge `predecessor -> successor` exists.
    pub fn has_edge(&self, predecessor: &T, successor: &T) -> bool {
        self.edge_state(predecessor, successor) == Some(EdgeState::Connected)
    }

    /// Whether `predecessor` must run (transitively) before `successor`.
    pub fn reaches(&self, predecessor: &T, successor: &T) -> bool {
        match (self.index_of(predecessor), self.index_of(successor)) {
            (Some(p), Some(s)) => self.graph.reaches(p, s),
            _ => false,
        }
    }

    /// Direct predecessors of `task`.
    pub fn dependencies_of(&self, task: &T) -> Vec<&T> {
        match self.index_of(task) {
            Some(i) => self.graph.predecessors_of(i).map(|p| &self.tasks[p]).collect(),
            None => Vec::new(),
        }
    }

    /// Direct successors of `task`.
    pub fn dependents_of(&self, task: &T) -> Vec<&T> {
        match self.index_of(task) {
            Some(i) => self.graph.successors_of(i).map(|s| &self.tasks[s]).collect(),
            None => Vec::new(),
        }
    }

    /// Tasks without any predecessor.
    pub fn roots(&self) -> Vec<&T> {
        self.graph
            .ready_tasks()
            .into_iter()
            .map(|i| &self.tasks[i])
            .collect()
    }

    /// Committed edges as task pairs.
    pub fn edges(&self) -> Vec<(&T, &T)> {
        self.graph
            .edges()
            .map(|(p, s)| (&self.tasks[p], &self.tasks[s]))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fresh run snapshot of the matrices.
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot::new(self.graph.clone())
    }

    /// Graphviz DOT rendering of the committed edges, for diagnostics.
    pub fn to_dot(&self) -> String {
        let mut dot = DiGraph::<String, ()>::with_capacity(self.tasks.len(), self.edge_count());
        let nodes: Vec<_> = self
            .tasks
            .iter()
            .map(|task| dot.add_node(format!("{task:?}")))
            .collect();

        for (p, s) in self.graph.edges() {
            dot.add_edge(nodes[p], nodes[s], ());
        }

        format!("{:?}", Dot::with_config(&dot, &[Config::EdgeNoLabel]))
    }
}
