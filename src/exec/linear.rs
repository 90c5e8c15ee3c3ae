// src/exec/linear.rs

//! Synchronous topological listing.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::dag::CompiledGraph;

/// One valid execution order of `graph`.
///
/// Works on a private snapshot: tasks with no predecessor seed a FIFO queue
/// in index order, and every dequeued task releases its outgoing edges,
/// enqueueing successors whose last incoming edge just went away. Ties are
/// therefore broken by registration order.
pub fn linear_order<T>(graph: &CompiledGraph<T>) -> Vec<T>
where
    T: Clone + Eq + Hash + Debug,
{
    let mut snapshot = graph.snapshot();
    let mut queue: VecDeque<usize> = snapshot.initial_ready().into();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(index) = queue.pop_front() {
        order.push(graph.tasks()[index].clone());
        queue.extend(snapshot.release(index));
    }

    // An acyclic graph always drains completely.
    debug_assert!(snapshot.is_exhausted());
    debug!(tasks = order.len(), "linear order computed");
    order
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dag::compile;
    use crate::rules::{DependencyRule, Rule, SortRule};

    #[test]
    fn no_rules_keeps_registration_order() {
        let graph = compile(&["c", "a", "b"], &[]).unwrap();
        assert_eq!(linear_order(&graph), vec!["c", "a", "b"]);
    }

    #[test]
    fn ready_tasks_are_taken_breadth_first() {
        // a -> c, b -> d: both roots come first, then their successors.
        let rules: Vec<Arc<dyn Rule<&str>>> = vec![
            Arc::new(DependencyRule::between("a", "c")),
            Arc::new(DependencyRule::between("b", "d")),
        ];
        let graph = compile(&["a", "b", "c", "d"], &rules).unwrap();
        assert_eq!(linear_order(&graph), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn diamond_waits_for_both_branches() {
        let rules: Vec<Arc<dyn Rule<&str>>> = vec![
            Arc::new(DependencyRule::new(vec!["left", "right"], vec!["join"])),
            Arc::new(DependencyRule::new(vec!["root"], vec!["left", "right"])),
        ];
        let graph = compile(&["join", "right", "left", "root"], &rules).unwrap();
        assert_eq!(linear_order(&graph), vec!["root", "right", "left", "join"]);
    }

    #[test]
    fn compiled_graph_is_not_consumed() {
        let rules: Vec<Arc<dyn Rule<u32>>> = vec![Arc::new(SortRule::by_key(|t: &u32| *t))];
        let graph = compile(&[3, 1, 2], &rules).unwrap();

        assert_eq!(linear_order(&graph), vec![1, 2, 3]);
        assert_eq!(linear_order(&graph), vec![1, 2, 3]);
        assert_eq!(graph.edge_count(), 2);
    }
}
