// src/lib.rs

//! Dependency-aware task scheduling.
//!
//! Tasks are opaque values; ordering comes from declarative rules
//! ([`rules::DependencyRule`], [`rules::SortRule`]) compiled into a
//! cycle-free graph ([`dag`]). A [`scheduler::Scheduler`] caches that graph
//! until its tasks or rules change, and the engines in [`exec`] either list
//! one valid order or run every task concurrently as soon as its
//! predecessors are done.

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod rules;
pub mod scheduler;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::exec::{AsyncScheduler, CommandTask, ShellAction};
use crate::scheduler::Scheduler;

/// High-level entry point used by `main.rs`.
///
/// Loads the plan file, builds the scheduler, then either prints the plan
/// (`--dry-run`), prints the DOT graph (`--graph`), or runs every task.
/// Ctrl-C cancels the run.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading plan file {}", config_path.display()))?;

    let scheduler = Scheduler::from_config(&cfg)?;

    if args.graph {
        print!("{}", scheduler.graph()?.to_dot());
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&scheduler)?;
        return Ok(());
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling run");
            cancel.cancel();
        });
    }

    // Compile off the runtime workers; the run then starts from a warm cache.
    let scheduler = tokio::task::spawn_blocking(move || -> Result<_> {
        scheduler.graph()?;
        Ok(scheduler)
    })
    .await
    .context("graph compilation task failed")??;

    let engine = AsyncScheduler::with_scheduler(scheduler, ShellAction);
    let report = engine.run(config_root_dir(&config_path), cancel).await?;
    info!(
        run_id = report.run_id,
        completed = report.completed.len(),
        "all tasks finished"
    );
    Ok(())
}

/// Directory the plan file lives in; commands run relative to it.
///
/// A bare filename like `Taskweave.toml` (empty parent) falls back to the
/// current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print the linear order with each task's command and direct dependencies.
fn print_dry_run(scheduler: &Scheduler<CommandTask>) -> Result<()> {
    let graph = scheduler.graph()?;
    let order = scheduler.plan()?;

    println!("taskweave dry-run");
    println!(
        "  {} tasks, {} rules, {} edges",
        graph.len(),
        scheduler.rules().len(),
        graph.edge_count()
    );
    println!();

    for (position, task) in order.iter().enumerate() {
        println!("{:>3}. {}", position + 1, task.name);
        println!("       cmd: {}", task.cmd);
        let deps = graph.dependencies_of(task);
        if !deps.is_empty() {
            println!("       after: {deps:?}");
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_config_name_uses_current_dir() {
        let dir = config_root_dir(Path::new("Taskweave.toml"));
        assert_eq!(dir, std::env::current_dir().unwrap());
        assert_eq!(
            config_root_dir(Path::new("plans/ci.toml")),
            PathBuf::from("plans")
        );
    }
}
