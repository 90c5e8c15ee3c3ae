// tests/dirty_tracking.rs

mod common;
use crate::common::{init_tracing, scheduler_with};

use std::sync::{Arc, RwLock};

use taskweave::errors::TaskweaveError;
use taskweave::rules::{DependencyRule, LiveSet, SortRule};

#[test]
fn repeated_plans_hit_the_cache() {
    init_tracing();

    let mut scheduler = scheduler_with(&["a", "b", "c"]);
    scheduler.add_rule(DependencyRule::between("c", "b"));

    let first = scheduler.plan().unwrap();
    let graph = scheduler.graph().unwrap();
    let second = scheduler.plan().unwrap();
    let graph_again = scheduler.graph().unwrap();

    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&graph, &graph_again));
    assert_eq!(scheduler.compilations(), 1);
    assert_eq!(graph.stats(), graph_again.stats());
}

#[test]
fn each_mutation_is_reflected_exactly_once() {
    let mut scheduler = scheduler_with(&["a", "b"]);
    assert_eq!(scheduler.plan().unwrap(), vec!["a", "b"]);

    let rule = scheduler.add_rule(DependencyRule::between("b", "a"));
    assert!(scheduler.is_dirty());
    assert_eq!(scheduler.plan().unwrap(), vec!["b", "a"]);
    assert!(!scheduler.is_dirty());

    scheduler.tasks_mut().insert(0, "first").unwrap();
    assert_eq!(scheduler.plan().unwrap(), vec!["first", "b", "a"]);

    scheduler.tasks_mut().replace(0, "zeroth").unwrap();
    assert_eq!(scheduler.plan().unwrap(), vec!["zeroth", "b", "a"]);

    scheduler.remove_rule(&rule);
    scheduler.remove_task(&"zeroth");
    assert_eq!(scheduler.plan().unwrap(), vec!["a", "b"]);

    scheduler.rules_mut().clear();
    scheduler.tasks_mut().clear();
    assert!(scheduler.plan().unwrap().is_empty());

    assert_eq!(scheduler.compilations(), 6);
}

#[test]
fn live_sets_and_key_changes_invalidate_the_cache() {
    let stage = Arc::new(RwLock::new(vec![("a", 2), ("b", 1)]));
    let lookup = Arc::clone(&stage);

    let mut scheduler = scheduler_with(&["a", "b", "c"]);
    let sort = SortRule::by_key(move |t: &&str| {
        lookup
            .read()
            .unwrap()
            .iter()
            .find(|(name, _)| name == t)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    })
    .over(vec!["a", "b"]);
    let keys = sort.key_change_handle();
    scheduler.add_rule(sort);

    let before_c = LiveSet::new();
    scheduler.add_rule(DependencyRule::new(before_c.clone(), vec!["c"]));

    assert_eq!(scheduler.plan().unwrap(), vec!["b", "c", "a"]);

    // Key change without notification is not observed...
    stage.write().unwrap()[0].1 = 0;
    assert!(!scheduler.is_dirty());
    // ...until the rule is told.
    keys.bump();
    assert!(scheduler.is_dirty());
    assert_eq!(scheduler.plan().unwrap(), vec!["a", "c", "b"]);

    before_c.insert("b");
    assert!(scheduler.is_dirty());
    assert_eq!(scheduler.plan().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn batches_defer_queries_until_closed() {
    let mut scheduler = scheduler_with(&["a"]);
    scheduler.plan().unwrap();

    scheduler.begin_batch();
    scheduler.add_task("b").unwrap();
    scheduler.add_rule(DependencyRule::between("b", "a"));
    assert!(scheduler.is_batching());
    assert!(matches!(scheduler.plan(), Err(TaskweaveError::InvalidState(_))));
    scheduler.end_batch().unwrap();

    assert_eq!(scheduler.plan().unwrap(), vec!["b", "a"]);
    assert_eq!(scheduler.compilations(), 2);
}

#[test]
fn failed_compile_leaves_scheduler_dirty() {
    let mut scheduler = scheduler_with(&["a"]);
    let bad = scheduler.add_rule(DependencyRule::between("a", "a"));

    assert!(scheduler.plan().is_err());
    assert!(scheduler.is_dirty());
    assert_eq!(scheduler.compilations(), 0);

    scheduler.remove_rule(&bad);
    assert_eq!(scheduler.plan().unwrap(), vec!["a"]);
}
