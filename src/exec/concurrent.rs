// src/exec/concurrent.rs

//! Concurrent run-to-completion engine.
//!
//! Each run takes its own [`RunSnapshot`] of the cached compiled graph and
//! launches one Tokio task ("unit") per ready task. A unit runs the task's
//! action, then locks the snapshot just long enough to release the task's
//! outgoing edges and collect the successors that became ready. The driver
//! loop spawns those successors and waits until every unit has finished.
//!
//! Cancellation is cooperative: the run token is checked before every unit
//! starts its action and passed to the action itself. An action that stops
//! early because the caller cancelled the run counts as interrupted, not
//! failed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::dag::{CompiledGraph, RunSnapshot};
use crate::errors::{Result, TaskweaveError};
use crate::exec::action::TaskAction;
use crate::scheduler::{Scheduler, TaskItem};

/// Summary of a run that finished without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport<T> {
    pub run_id: u64,
    /// Tasks in the order their actions completed.
    pub completed: Vec<T>,
}

/// What a unit reports back to the driver loop.
enum UnitOutcome {
    Completed { index: usize, next: Vec<usize> },
    Skipped { index: usize },
    Interrupted { index: usize, error: anyhow::Error },
}

/// A [`Scheduler`] paired with the action executed for every task.
pub struct AsyncScheduler<T: TaskItem, P> {
    scheduler: Scheduler<T>,
    action: Arc<dyn TaskAction<T, P>>,
    runs: AtomicU64,
}

impl<T, P> AsyncScheduler<T, P>
where
    T: TaskItem,
    P: Clone + Send + 'static,
{
    pub fn new<A>(action: A) -> Self
    where
        A: TaskAction<T, P> + 'static,
    {
        Self::with_scheduler(Scheduler::new(), action)
    }

    pub fn with_scheduler<A>(scheduler: Scheduler<T>, action: A) -> Self
    where
        A: TaskAction<T, P> + 'static,
    {
        Self {
            scheduler,
            action: Arc::new(action),
            runs: AtomicU64::new(0),
        }
    }

    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<T> {
        &mut self.scheduler
    }

    /// Execute every task once, honouring all dependencies.
    ///
    /// Safe to call concurrently: every call works on its own snapshot.
    /// Fails with [`TaskweaveError::Cancelled`] if `cancel` fires before every
    /// task has run, and with the first [`TaskweaveError::TaskFailed`] if an
    /// action errors. After a failure no new task is started; tasks already
    /// in flight are awaited.
    ///
    /// If the scheduler is dirty the graph is recompiled synchronously
    /// before the first await, on the calling worker thread. For large task
    /// sets call `scheduler().graph()` ahead of time (for example from
    /// `spawn_blocking`) so the run starts from a warm cache.
    pub async fn run(&self, param: P, cancel: CancellationToken) -> Result<RunReport<T>> {
        if cancel.is_cancelled() {
            return Err(TaskweaveError::Cancelled);
        }

        let graph = self.scheduler.graph_for_run()?;
        let run_id = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let snapshot = graph.snapshot();
        let ready = snapshot.initial_ready();

        info!(run_id, tasks = graph.len(), ready = ready.len(), "run started");

        let ctx = RunContext {
            run_id,
            graph: Arc::clone(&graph),
            snapshot: Arc::new(Mutex::new(snapshot)),
            action: Arc::clone(&self.action),
            param,
            stop: cancel.child_token(),
            cancel,
        };

        let mut units = JoinSet::new();
        for index in ready {
            ctx.spawn(&mut units, index);
        }

        let mut completed = Vec::with_capacity(graph.len());
        let mut failure: Option<TaskweaveError> = None;

        while let Some(joined) = units.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(join_err) => Err(TaskweaveError::Other(anyhow::anyhow!(
                    "task unit panicked or was aborted: {join_err}"
                ))),
            };

            match outcome {
                Ok(UnitOutcome::Completed { index, next }) => {
                    completed.push(graph.tasks()[index].clone());
                    if failure.is_none() && !ctx.stop.is_cancelled() {
                        for successor in next {
                            ctx.spawn(&mut units, successor);
                        }
                    }
                }
                Ok(UnitOutcome::Skipped { index }) => {
                    debug!(run_id, task = ?graph.tasks()[index], "task skipped (run cancelled)");
                }
                Ok(UnitOutcome::Interrupted { index, error }) => {
                    info!(run_id, task = ?graph.tasks()[index], error = %error, "task interrupted by cancellation");
                }
                Err(err) => {
                    error!(run_id, error = %err, "task unit failed; stopping run");
                    if failure.is_none() {
                        failure = Some(err);
                        ctx.stop.cancel();
                    }
                }
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }

        if completed.len() < graph.len() {
            info!(
                run_id,
                completed = completed.len(),
                tasks = graph.len(),
                "run cancelled"
            );
            return Err(TaskweaveError::Cancelled);
        }

        info!(run_id, completed = completed.len(), "run finished");
        Ok(RunReport { run_id, completed })
    }
}

/// Everything a unit needs, shared by all units of one run.
struct RunContext<T, P> {
    run_id: u64,
    graph: Arc<CompiledGraph<T>>,
    snapshot: Arc<Mutex<RunSnapshot>>,
    action: Arc<dyn TaskAction<T, P>>,
    param: P,
    /// Token supplied by the caller of `run`.
    cancel: CancellationToken,
    /// Child of `cancel`, also fired by the first failure. Handed to actions.
    stop: CancellationToken,
}

impl<T, P> RunContext<T, P>
where
    T: TaskItem,
    P: Clone + Send + 'static,
{
    fn spawn(&self, units: &mut JoinSet<Result<UnitOutcome>>, index: usize) {
        let run_id = self.run_id;
        let task = self.graph.tasks()[index].clone();
        let snapshot = Arc::clone(&self.snapshot);
        let action = Arc::clone(&self.action);
        let param = self.param.clone();
        let cancel = self.cancel.clone();
        let stop = self.stop.clone();

        units.spawn(async move {
            if stop.is_cancelled() {
                return Ok(UnitOutcome::Skipped { index });
            }

            debug!(run_id, task = ?task, "task started");
            if let Err(source) = action.call(task.clone(), param, stop).await {
                if cancel.is_cancelled() {
                    return Ok(UnitOutcome::Interrupted {
                        index,
                        error: source,
                    });
                }
                return Err(TaskweaveError::TaskFailed {
                    task: format!("{task:?}"),
                    source,
                });
            }

            let next = {
                let mut snapshot = snapshot.lock().await;
                snapshot.release(index)
            };
            debug!(run_id, task = ?task, unlocked = next.len(), "task finished");

            Ok(UnitOutcome::Completed { index, next })
        });
    }
}
