// tests/linear_order.rs

mod common;
use crate::common::{index_in, init_tracing, scheduler_with};

use taskweave::rules::{DependencyRule, SortRule};

#[test]
fn sort_rule_groups_equal_keys_and_chains_groups() {
    init_tracing();

    let values = [("a", 1), ("b", 2), ("c", 1), ("d", 3)];
    let mut scheduler = scheduler_with(&["a", "b", "c", "d"]);
    scheduler.add_rule(SortRule::by_key(move |t: &&str| {
        values
            .iter()
            .find(|(name, _)| name == t)
            .map(|(_, v)| *v)
            .unwrap_or_default()
    }));

    let graph = scheduler.graph().unwrap();
    for early in ["a", "c"] {
        assert!(graph.has_edge(&early, &"b"), "{early} -> b");
        assert!(graph.reaches(&early, &"d"), "{early} ->* d");
    }
    assert!(graph.has_edge(&"b", &"d"));
    assert!(!graph.reaches(&"a", &"c"));
    assert!(!graph.reaches(&"c", &"a"));

    assert_eq!(scheduler.plan().unwrap(), vec!["a", "c", "b", "d"]);
}

#[test]
fn every_edge_is_respected_in_a_larger_plan() {
    init_tracing();

    let mut scheduler = scheduler_with(&["deploy", "test", "lint", "build", "fetch", "docs"]);
    scheduler.add_rule(DependencyRule::between("fetch", "build"));
    scheduler.add_rule(DependencyRule::new(vec!["build"], vec!["test", "docs"]));
    scheduler.add_rule(DependencyRule::new(vec!["test", "lint"], vec!["deploy"]));

    let order = scheduler.plan().unwrap();
    assert_eq!(order.len(), 6);

    let graph = scheduler.graph().unwrap();
    for (p, s) in graph.edges() {
        assert!(index_in(&order, p) < index_in(&order, s), "{p} before {s} in {order:?}");
    }
    // Roots come first, in registration order.
    assert_eq!(&order[..2], &["lint", "fetch"]);
}

#[test]
fn linear_order_alias_matches_plan() {
    let mut scheduler = scheduler_with(&["x", "y"]);
    scheduler.add_rule(DependencyRule::between("y", "x"));
    assert_eq!(scheduler.linear_order().unwrap(), scheduler.plan().unwrap());
}

#[test]
fn empty_scheduler_has_empty_plan() {
    let scheduler = scheduler_with(&[]);
    assert!(scheduler.plan().unwrap().is_empty());
    assert!(scheduler.graph().unwrap().is_empty());
}
