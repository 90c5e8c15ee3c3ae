// src/dag/builder.rs

//! Compiles an ordered task list and an ordered rule list into a
//! [`CompiledGraph`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, info};

use crate::dag::compiled::CompiledGraph;
use crate::dag::graph::DependencyGraph;
use crate::errors::{Result, TaskweaveError};
use crate::rules::{DependencyBuilder, Rule};

/// Counters collected while compiling, for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Rules that passed the validity filter and were applied.
    pub rules_applied: usize,
    /// Edges committed.
    pub edges_added: usize,
    /// Requests for an edge that already existed.
    pub duplicate_requests: usize,
    /// Requests naming a task outside the compiled task list.
    pub unknown_task_requests: usize,
    /// Cycle-forming requests dropped because their rule did not have to apply.
    pub cycles_skipped: usize,
}

/// [`DependencyBuilder`] that owns the matrices while rules are applied.
pub struct GraphBuilder<'a, T> {
    tasks: &'a [T],
    index: HashMap<T, usize>,
    graph: DependencyGraph,
    stats: CompileStats,
}

impl<'a, T> GraphBuilder<'a, T>
where
    T: Clone + Eq + Hash + Debug,
{
    /// Assign each task its list index. Fails on equal tasks.
    pub fn new(tasks: &'a [T]) -> Result<Self> {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.clone(), i).is_some() {
                return Err(TaskweaveError::DuplicateTask(format!("{task:?}")));
            }
        }

        Ok(Self {
            tasks,
            index,
            graph: DependencyGraph::new(tasks.len()),
            stats: CompileStats::default(),
        })
    }

    pub fn stats(&self) -> CompileStats {
        self.stats
    }

    pub fn finish(self) -> CompiledGraph<T> {
        CompiledGraph::new(self.tasks.to_vec(), self.index, self.graph, self.stats)
    }
}

impl<T> DependencyBuilder<T> for GraphBuilder<'_, T>
where
    T: Clone + Eq + Hash + Debug,
{
    fn tasks(&self) -> &[T] {
        self.tasks
    }

    fn try_add_dependency(
        &mut self,
        predecessor: &T,
        successor: &T,
        rule: &dyn Rule<T>,
    ) -> Result<bool> {
        if predecessor == successor {
            return Err(TaskweaveError::SelfDependency(format!("{predecessor:?}")));
        }

        let (Some(&p), Some(&s)) = (self.index.get(predecessor), self.index.get(successor)) else {
            self.stats.unknown_task_requests += 1;
            return Ok(false);
        };

        if self.graph.is_connected(p, s) {
            self.stats.duplicate_requests += 1;
            return Ok(false);
        }

        if self.graph.would_create_cycle(p, s) {
            if rule.must_apply() {
                return Err(TaskweaveError::CycleViolation {
                    predecessor: format!("{predecessor:?}"),
                    successor: format!("{successor:?}"),
                    rule: rule.name(),
                });
            }

            debug!(
                predecessor = ?predecessor,
                successor = ?successor,
                rule = %rule.name(),
                "edge would create a cycle; skipping"
            );
            self.stats.cycles_skipped += 1;
            return Ok(false);
        }

        self.graph.connect(p, s);
        self.stats.edges_added += 1;
        Ok(true)
    }
}

/// Build the dependency graph for `tasks` under `rules`.
///
/// Invalid rules are ignored. The remaining rules are applied by weight,
/// highest first; equal weights keep their list order.
pub fn compile<T>(tasks: &[T], rules: &[Arc<dyn Rule<T>>]) -> Result<CompiledGraph<T>>
where
    T: Clone + Eq + Hash + Debug,
{
    let mut builder = GraphBuilder::new(tasks)?;

    let mut ordered: Vec<&Arc<dyn Rule<T>>> = rules.iter().filter(|r| r.is_valid()).collect();
    ordered.sort_by(|a, b| b.weight().total_cmp(&a.weight()));

    for rule in ordered {
        debug!(rule = %rule.name(), weight = rule.weight(), must_apply = rule.must_apply(), "applying rule");
        rule.apply(&mut builder)?;
        builder.stats.rules_applied += 1;
    }

    let stats = builder.stats();
    info!(
        tasks = tasks.len(),
        rules = rules.len(),
        rules_applied = stats.rules_applied,
        edges = stats.edges_added,
        cycles_skipped = stats.cycles_skipped,
        "dependency graph compiled"
    );

    Ok(builder.finish())
}
