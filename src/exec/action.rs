// src/exec/action.rs

//! Pluggable per-task action.
//!
//! The concurrent engine talks to a `TaskAction` instead of running anything
//! itself. Production code plugs in [`ShellAction`](crate::exec::ShellAction);
//! tests plug in a recording fake that never spawns processes.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

/// Boxed future returned by a [`TaskAction`].
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Work performed for one task during a concurrent run.
///
/// `cancel` is the run's token. Actions already in flight are not aborted by
/// the engine; long-running actions should watch the token themselves.
pub trait TaskAction<T, P>: Send + Sync {
    fn call(&self, task: T, param: P, cancel: CancellationToken) -> ActionFuture;
}

impl<T, P, F, Fut> TaskAction<T, P> for F
where
    F: Fn(T, P, CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, task: T, param: P, cancel: CancellationToken) -> ActionFuture {
        Box::pin(self(task, param, cancel))
    }
}
