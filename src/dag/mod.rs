// src/dag/mod.rs

//! Dependency graph compilation.
//!
//! - [`graph`] holds the index-based matrices and the incremental
//!   transitive closure that rejects cycle-forming edges.
//! - [`builder`] compiles tasks + rules into a graph.
//! - [`compiled`] is the read-only result keyed by task values.
//! - [`snapshot`] is the per-run copy consumed by the execution engines.

pub mod builder;
pub mod compiled;
pub mod graph;
pub mod snapshot;

pub use builder::{CompileStats, GraphBuilder, compile};
pub use compiled::CompiledGraph;
pub use graph::DependencyGraph;
pub use snapshot::RunSnapshot;
