// tests/rule_conflicts.rs

mod common;
use crate::common::{init_tracing, scheduler_with};

use taskweave::errors::TaskweaveError;
use taskweave::rules::{DependencyRule, SortRule};
use taskweave::types::{EdgeState, SortOrder};

#[test]
fn optional_conflict_keeps_exactly_one_edge() {
    init_tracing();

    let mut scheduler = scheduler_with(&["p", "s"]);
    scheduler.add_rule(DependencyRule::between("p", "s"));
    scheduler.add_rule(DependencyRule::between("s", "p"));

    let graph = scheduler.graph().unwrap();
    assert!(graph.has_edge(&"p", &"s") ^ graph.has_edge(&"s", &"p"));
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.stats().cycles_skipped, 1);
}

#[test]
fn mandatory_conflict_is_reported_with_rule_name() {
    init_tracing();

    let mut scheduler = scheduler_with(&["p", "s"]);
    scheduler.add_rule(DependencyRule::between("p", "s"));
    scheduler.add_rule(DependencyRule::between("s", "p").must_apply(true).named("s first"));

    match scheduler.plan() {
        Err(TaskweaveError::CycleViolation {
            predecessor,
            successor,
            rule,
        }) => {
            assert_eq!(predecessor, "\"s\"");
            assert_eq!(successor, "\"p\"");
            assert_eq!(rule, "s first");
        }
        other => panic!("expected CycleViolation, got {other:?}"),
    }
}

#[test]
fn self_dependency_fails_at_compile_time() {
    let mut scheduler = scheduler_with(&["x"]);
    scheduler.add_rule(DependencyRule::new(vec!["x"], vec!["x"]));

    let err = scheduler.plan().unwrap_err();
    assert!(matches!(err, TaskweaveError::SelfDependency(ref t) if t == "\"x\""));
}

#[test]
fn weight_decides_which_rule_wins() {
    let mut scheduler = scheduler_with(&["a", "b", "c"]);
    // Registered first but lighter: loses to the heavier descending sort.
    scheduler.add_rule(DependencyRule::between("a", "c").with_weight(1.0));
    scheduler.add_rule(
        SortRule::by_key(|t: &&str| t.as_bytes()[0])
            .order(SortOrder::Descending)
            .with_weight(10.0),
    );

    assert_eq!(scheduler.plan().unwrap(), vec!["c", "b", "a"]);
    let graph = scheduler.graph().unwrap();
    assert_eq!(graph.edge_state(&"a", &"c"), Some(EdgeState::WouldCreateCycle));
}

#[test]
fn sort_subset_leaves_other_tasks_free() {
    let mut scheduler = scheduler_with(&["z", "y", "free"]);
    scheduler.add_rule(SortRule::by_key(|t: &&str| t.to_string()).over(vec!["z", "y"]));

    let graph = scheduler.graph().unwrap();
    assert!(graph.has_edge(&"y", &"z"));
    assert!(graph.dependencies_of(&"free").is_empty());
    assert!(graph.dependents_of(&"free").is_empty());
}

#[test]
fn rules_may_name_unregistered_tasks() {
    let mut scheduler = scheduler_with(&["a", "b"]);
    scheduler.add_rule(DependencyRule::between("c", "a"));
    scheduler.add_rule(DependencyRule::between("b", "ghost"));

    let graph = scheduler.graph().unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.stats().unknown_task_requests, 2);

    scheduler.add_task("c").unwrap();
    assert_eq!(scheduler.plan().unwrap(), vec!["b", "c", "a"]);
}

#[test]
fn dot_export_lists_tasks_and_edges() {
    let mut scheduler = scheduler_with(&["fetch", "build"]);
    scheduler.add_rule(DependencyRule::between("fetch", "build"));

    let dot = scheduler.graph().unwrap().to_dot();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("fetch"));
    assert!(dot.contains("build"));
    assert!(dot.contains("0 -> 1"));
}
