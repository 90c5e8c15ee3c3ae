// tests/property_scheduler.rs

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use taskweave::dag::compile;
use taskweave::errors::TaskweaveError;
use taskweave::rules::{DependencyRule, Rule};
use taskweave::scheduler::Scheduler;

/// Random edge requests over `n` tasks. Requests may point either way, so
/// rule sets are frequently cyclic.
fn rule_set_strategy(max_tasks: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize, bool)>)> {
    (2..=max_tasks).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, 0..n, any::<bool>()), 0..(n * 3));
        (Just(n), edges)
    })
}

fn rules_for(requests: &[(usize, usize, bool)], must_apply: bool) -> Vec<Arc<dyn Rule<usize>>> {
    requests
        .iter()
        .filter(|(p, s, _)| p != s)
        .map(|&(p, s, heavy)| {
            let weight = if heavy { 1.0 } else { 0.0 };
            Arc::new(
                DependencyRule::between(p, s)
                    .with_weight(weight)
                    .must_apply(must_apply),
            ) as Arc<dyn Rule<usize>>
        })
        .collect()
}

proptest! {
    #[test]
    fn linear_order_is_a_permutation_respecting_every_edge(
        (n, requests) in rule_set_strategy(12)
    ) {
        let tasks: Vec<usize> = (0..n).collect();
        let graph = compile(&tasks, &rules_for(&requests, false)).unwrap();

        let mut scheduler = Scheduler::new();
        for t in &tasks {
            scheduler.add_task(*t).unwrap();
        }
        for rule in rules_for(&requests, false) {
            scheduler.add_shared_rule(rule);
        }
        let order = scheduler.plan().unwrap();

        let unique: HashSet<_> = order.iter().copied().collect();
        prop_assert_eq!(order.len(), n);
        prop_assert_eq!(unique.len(), n);

        let position = |t: usize| order.iter().position(|&x| x == t).unwrap();
        for (p, s) in graph.edges() {
            prop_assert!(position(*p) < position(*s));
        }
    }

    #[test]
    fn closure_matches_reachability_and_is_acyclic(
        (n, requests) in rule_set_strategy(10)
    ) {
        let tasks: Vec<usize> = (0..n).collect();
        let graph = compile(&tasks, &rules_for(&requests, false)).unwrap();

        // Plain DFS over committed edges.
        let reachable = |from: usize| {
            let mut seen = vec![false; n];
            let mut stack: Vec<usize> = graph.dependents_of(&from).into_iter().copied().collect();
            while let Some(t) = stack.pop() {
                if !seen[t] {
                    seen[t] = true;
                    stack.extend(graph.dependents_of(&t).into_iter().copied());
                }
            }
            seen
        };

        for a in 0..n {
            let seen = reachable(a);
            prop_assert!(!seen[a], "cycle through {}", a);
            for b in 0..n {
                prop_assert_eq!(graph.reaches(&a, &b), seen[b]);
            }
        }
    }

    #[test]
    fn mandatory_rules_either_commit_or_fail_with_cycle_violation(
        (n, requests) in rule_set_strategy(8)
    ) {
        let tasks: Vec<usize> = (0..n).collect();
        match compile(&tasks, &rules_for(&requests, true)) {
            Ok(graph) => {
                for &(p, s, _) in requests.iter().filter(|(p, s, _)| p != s) {
                    prop_assert!(graph.has_edge(&p, &s));
                }
            }
            Err(TaskweaveError::CycleViolation { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
        }
    }
}
