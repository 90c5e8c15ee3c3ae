// src/exec/mod.rs

//! Execution engines.
//!
//! - [`linear`] produces one deterministic topological order.
//! - [`concurrent`] runs every task's action as soon as its predecessors have
//!   finished, on its own snapshot of the compiled graph.
//! - [`action`] is the seam between the concurrent engine and the work it
//!   performs; tests replace it with a recording fake.
//! - [`command`] is the shell-command action used by the binary.

pub mod action;
pub mod command;
pub mod concurrent;
pub mod linear;

pub use action::{ActionFuture, TaskAction};
pub use command::{CommandTask, ShellAction, run_shell_command};
pub use concurrent::{AsyncScheduler, RunReport};
pub use linear::linear_order;
