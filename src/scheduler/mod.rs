// src/scheduler/mod.rs

//! Task/rule registries plus the cached compiled graph.
//!
//! - [`registry`] holds the observable task and rule lists.
//! - [`controller`] is a thin fluent adapter that turns "before/after/at
//!   start/at end" requests into rules.
//!
//! [`Scheduler`] only recompiles when something it compiled against has
//! changed: the task list, the rule list, or the revision of any member rule.

pub mod controller;
pub mod registry;

pub use controller::TaskController;
pub use registry::{RuleRegistry, TaskRegistry};

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::dag::{CompiledGraph, compile};
use crate::errors::{Result, TaskweaveError};
use crate::exec::linear::linear_order;
use crate::rules::Rule;

/// Bounds every scheduled task value satisfies: identity by equality, cheap
/// to clone, printable in logs, shareable with worker tasks.
pub trait TaskItem: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> TaskItem for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// What a compiled graph was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    tasks: u64,
    rules: u64,
    members: Vec<u64>,
}

#[derive(Debug)]
struct GraphCache<T> {
    stamp: Option<Stamp>,
    graph: Option<Arc<CompiledGraph<T>>>,
    plan: Option<Arc<Vec<T>>>,
    compilations: u64,
}

impl<T> Default for GraphCache<T> {
    fn default() -> Self {
        Self {
            stamp: None,
            graph: None,
            plan: None,
            compilations: 0,
        }
    }
}

/// Owns the task and rule registries and caches the compiled graph.
///
/// Mutations go through `&mut self`; compilation and queries go through
/// `&self` so several runs can share one scheduler.
#[derive(Debug)]
pub struct Scheduler<T> {
    tasks: TaskRegistry<T>,
    rules: RuleRegistry<T>,
    batch_depth: usize,
    cache: Mutex<GraphCache<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: TaskRegistry::default(),
            rules: RuleRegistry::default(),
            batch_depth: 0,
            cache: Mutex::new(GraphCache::default()),
        }
    }
}

impl<T: TaskItem> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &TaskRegistry<T> {
        &self.tasks
    }

    /// Direct access to the task registry; every structural change marks the
    /// scheduler dirty.
    pub fn tasks_mut(&mut self) -> &mut TaskRegistry<T> {
        &mut self.tasks
    }

    pub fn rules(&self) -> &RuleRegistry<T> {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleRegistry<T> {
        &mut self.rules
    }

    pub fn add_task(&mut self, task: T) -> Result<()> {
        self.tasks.add(task)
    }

    pub fn remove_task(&mut self, task: &T) -> bool {
        self.tasks.remove(task)
    }

    /// Register a rule and return the shared handle used to remove it later.
    pub fn add_rule<R>(&mut self, rule: R) -> Arc<dyn Rule<T>>
    where
        R: Rule<T> + 'static,
    {
        let rule: Arc<dyn Rule<T>> = Arc::new(rule);
        self.rules.add(Arc::clone(&rule));
        rule
    }

    /// Register a rule the caller already shares (e.g. to keep calling
    /// methods on its concrete type).
    pub fn add_shared_rule(&mut self, rule: Arc<dyn Rule<T>>) {
        self.rules.add(rule);
    }

    pub fn remove_rule(&mut self, rule: &Arc<dyn Rule<T>>) -> bool {
        self.rules.remove(rule)
    }

    /// Fluent entry point: register `task` if needed and return a controller
    /// to order it relative to others.
    pub fn plan_task(&mut self, task: T) -> Result<TaskController<'_, T>> {
        TaskController::new(self, task)
    }

    /// Open a (nestable) batch of mutations. Queries fail until every batch
    /// is closed.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
        debug!(depth = self.batch_depth, "batch opened");
    }

    pub fn end_batch(&mut self) -> Result<()> {
        if self.batch_depth == 0 {
            return Err(TaskweaveError::InvalidState(
                "end_batch called without a matching begin_batch".to_string(),
            ));
        }
        self.batch_depth -= 1;
        debug!(depth = self.batch_depth, "batch closed");
        Ok(())
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    fn current_stamp(&self) -> Stamp {
        Stamp {
            tasks: self.tasks.revision(),
            rules: self.rules.revision(),
            members: self.rules.member_revisions(),
        }
    }

    /// Whether the next query will recompile.
    pub fn is_dirty(&self) -> bool {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.stamp.as_ref() != Some(&self.current_stamp())
    }

    /// Number of successful compilations so far.
    pub fn compilations(&self) -> u64 {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .compilations
    }

    fn ensure_not_batching(&self, operation: &str) -> Result<()> {
        if self.is_batching() {
            return Err(TaskweaveError::InvalidState(format!(
                "cannot {operation} while a mutation batch is open; call end_batch() first"
            )));
        }
        Ok(())
    }

    /// Current compiled graph, recompiling first if dirty.
    ///
    /// A failed compilation leaves the previously cached graph in place and
    /// the scheduler still dirty.
    pub fn graph(&self) -> Result<Arc<CompiledGraph<T>>> {
        self.ensure_not_batching("read the dependency graph")?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut cache)
    }

    fn refresh(&self, cache: &mut GraphCache<T>) -> Result<Arc<CompiledGraph<T>>> {
        let stamp = self.current_stamp();
        if let (Some(cached), Some(graph)) = (&cache.stamp, &cache.graph) {
            if *cached == stamp {
                return Ok(Arc::clone(graph));
            }
        }

        let graph = Arc::new(compile(self.tasks.as_slice(), self.rules.as_slice())?);

        cache.compilations += 1;
        cache.stamp = Some(stamp);
        cache.graph = Some(Arc::clone(&graph));
        cache.plan = None;
        info!(
            compilations = cache.compilations,
            tasks = graph.len(),
            edges = graph.edge_count(),
            "scheduler cache refreshed"
        );

        Ok(graph)
    }

    /// Linear execution order consistent with every committed edge.
    ///
    /// Ties between simultaneously ready tasks are broken by registration
    /// order. The result is cached alongside the graph.
    pub fn plan(&self) -> Result<Vec<T>> {
        self.ensure_not_batching("compute the execution order")?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let graph = self.refresh(&mut cache)?;

        if let Some(plan) = &cache.plan {
            return Ok(plan.as_ref().clone());
        }

        let plan = Arc::new(linear_order(&graph));
        cache.plan = Some(Arc::clone(&plan));
        Ok(plan.as_ref().clone())
    }

    /// Alias of [`Scheduler::plan`].
    pub fn linear_order(&self) -> Result<Vec<T>> {
        self.plan()
    }

    /// Graph for a new run. Used by the concurrent engine.
    pub(crate) fn graph_for_run(&self) -> Result<Arc<CompiledGraph<T>>> {
        self.ensure_not_batching("start a run")?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh(&mut cache)
    }
}
