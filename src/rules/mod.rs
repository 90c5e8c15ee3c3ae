// src/rules/mod.rs

//! Declarative ordering rules.
//!
//! A rule is compiled into zero or more dependency edges by calling back into
//! a [`DependencyBuilder`]. Rules carry a weight (higher weights are applied
//! first) and a `must_apply` flag that turns a cycle conflict into a hard
//! error instead of a silently dropped edge.
//!
//! - [`dependency`] holds explicit predecessor/successor rules.
//! - [`sort`] holds key-based grouping rules.
//! - [`live`] provides the change tracking used to mark a scheduler dirty.

pub mod dependency;
pub mod live;
pub mod sort;

pub use dependency::DependencyRule;
pub use live::{LiveSet, Revision, TaskSet};
pub use sort::SortRule;

use std::fmt::Debug;

use crate::errors::Result;

/// Sink for the edges requested by a rule.
pub trait DependencyBuilder<T> {
    /// Every task being compiled, in index order.
    fn tasks(&self) -> &[T];

    /// Request the edge `predecessor -> successor` on behalf of `rule`.
    ///
    /// Returns `Ok(true)` if the edge was committed and `Ok(false)` if it was
    /// skipped (unknown task, already present, or cycle-forming for a rule
    /// that does not have to apply).
    fn try_add_dependency(
        &mut self,
        predecessor: &T,
        successor: &T,
        rule: &dyn Rule<T>,
    ) -> Result<bool>;
}

/// A unit of ordering policy.
pub trait Rule<T>: Send + Sync + Debug {
    /// Short human-readable description used in logs and errors.
    fn name(&self) -> String;

    fn weight(&self) -> f64;

    fn must_apply(&self) -> bool;

    /// Whether the rule has enough configuration to produce edges.
    fn is_valid(&self) -> bool;

    /// Change counter for the rule's own observable state. The registry marks
    /// the scheduler dirty whenever this differs from the value seen at the
    /// last compilation.
    fn revision(&self) -> u64 {
        0
    }

    fn apply(&self, builder: &mut dyn DependencyBuilder<T>) -> Result<()>;
}

/// Weight and `must_apply` flag shared by all rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RuleSettings {
    pub weight: f64,
    pub must_apply: bool,
}

/// Request one edge per `predecessor x successor` pair.
///
/// Returns how many edges were committed.
pub fn add_cross_product<T>(
    builder: &mut dyn DependencyBuilder<T>,
    predecessors: &[T],
    successors: &[T],
    rule: &dyn Rule<T>,
) -> Result<usize> {
    let mut added = 0;
    for predecessor in predecessors {
        for successor in successors {
            if builder.try_add_dependency(predecessor, successor, rule)? {
                added += 1;
            }
        }
    }
    Ok(added)
}
