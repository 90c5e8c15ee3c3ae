// src/config/build.rs

//! Validated plan file -> scheduler of shell-command tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::model::{ConfigFile, RuleConfig};
use crate::errors::{Result, TaskweaveError};
use crate::exec::CommandTask;
use crate::rules::{DependencyRule, Rule, SortRule};
use crate::scheduler::Scheduler;

impl Scheduler<CommandTask> {
    /// Register every task of `cfg` (in name order) and one rule per
    /// `[[rule]]` entry (in file order).
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let tasks: BTreeMap<&str, CommandTask> = cfg
            .task
            .iter()
            .map(|(name, task)| {
                let mut command = CommandTask::new(name.clone(), task.cmd.clone());
                command.keys = task.keys.clone();
                (name.as_str(), command)
            })
            .collect();

        let mut scheduler = Scheduler::new();
        scheduler.begin_batch();
        for task in tasks.values() {
            scheduler.add_task(task.clone())?;
        }
        for rule in &cfg.rule {
            let rule = build_rule(rule, &tasks)?;
            debug!(rule = %rule.name(), "rule loaded from plan file");
            scheduler.add_shared_rule(rule);
        }
        scheduler.end_batch()?;

        Ok(scheduler)
    }
}

fn lookup(tasks: &BTreeMap<&str, CommandTask>, names: &[String]) -> Result<Vec<CommandTask>> {
    names
        .iter()
        .map(|name| {
            tasks.get(name.as_str()).cloned().ok_or_else(|| {
                TaskweaveError::ConfigError(format!("rule references unknown task '{name}'"))
            })
        })
        .collect()
}

fn build_rule(
    rule: &RuleConfig,
    tasks: &BTreeMap<&str, CommandTask>,
) -> Result<Arc<dyn Rule<CommandTask>>> {
    match rule {
        RuleConfig::Dependency(dep) => {
            let mut rule = DependencyRule::new(
                lookup(tasks, &dep.predecessors)?,
                lookup(tasks, &dep.successors)?,
            )
            .with_weight(dep.settings.weight)
            .must_apply(dep.settings.must_apply);
            if let Some(name) = &dep.settings.name {
                rule = rule.named(name.clone());
            }
            Ok(Arc::new(rule))
        }
        RuleConfig::Sort(sort) => {
            let key = sort.key.clone();
            let mut rule = SortRule::by_key(move |task: &CommandTask| task.key(&key))
                .order(sort.order)
                .with_weight(sort.settings.weight)
                .must_apply(sort.settings.must_apply);
            if let Some(subset) = &sort.tasks {
                rule = rule.over(lookup(tasks, subset)?);
            }
            if let Some(name) = &sort.settings.name {
                rule = rule.named(name.clone());
            }
            Ok(Arc::new(rule))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;

    fn scheduler(toml_src: &str) -> Scheduler<CommandTask> {
        let raw: RawConfigFile = toml::from_str(toml_src).unwrap();
        Scheduler::from_config(&ConfigFile::try_from(raw).unwrap()).unwrap()
    }

    fn names(order: Vec<CommandTask>) -> Vec<String> {
        order.into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn dependency_rules_order_tasks() {
        let s = scheduler(
            r#"
[task.a]
cmd = "echo a"

[task.b]
cmd = "echo b"

[[rule]]
kind = "dependency"
predecessors = ["b"]
successors = ["a"]
"#,
        );
        assert_eq!(names(s.plan().unwrap()), vec!["b", "a"]);
        assert!(!s.is_batching());
    }

    #[test]
    fn sort_rule_reads_task_keys() {
        let s = scheduler(
            r#"
[task.deploy]
cmd = "true"
keys = { stage = 3 }

[task.build]
cmd = "true"
keys = { stage = 2 }

[task.fetch]
cmd = "true"
keys = { stage = 1 }

[[rule]]
kind = "sort"
key = "stage"
"#,
        );
        assert_eq!(names(s.plan().unwrap()), vec!["fetch", "build", "deploy"]);
    }

    #[test]
    fn descending_subset_sort() {
        let s = scheduler(
            r#"
[task.a]
cmd = "true"
keys = { prio = 1 }

[task.b]
cmd = "true"
keys = { prio = 5 }

[task.c]
cmd = "true"

[[rule]]
kind = "sort"
key = "prio"
tasks = ["a", "b"]
order = "descending"
"#,
        );
        let graph = s.graph().unwrap();
        let a = CommandTask::new("a", "");
        let b = CommandTask::new("b", "");
        assert!(graph.has_edge(&b, &a));
        assert_eq!(graph.edge_count(), 1);
    }
}
