// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, RuleConfig};
use crate::errors::{Result, TaskweaveError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskweaveError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.task, raw.rule))
    }
}

/// Semantic checks on a deserialized plan file.
///
/// Ordering conflicts between rules are not checked here; the graph builder
/// resolves them (dropping the edge, or failing for `must_apply` rules).
pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    for (position, rule) in cfg.rule.iter().enumerate() {
        let label = rule_label(position, rule);
        validate_settings(&label, rule)?;
        match rule {
            RuleConfig::Dependency(dep) => {
                ensure_non_empty(&label, "predecessors", &dep.predecessors)?;
                ensure_non_empty(&label, "successors", &dep.successors)?;
                ensure_known_tasks(cfg, &label, &dep.predecessors)?;
                ensure_known_tasks(cfg, &label, &dep.successors)?;
            }
            RuleConfig::Sort(sort) => {
                if sort.key.trim().is_empty() {
                    return Err(TaskweaveError::ConfigError(format!(
                        "{label}: sort rules must name a `key`"
                    )));
                }
                let scope: Vec<&String> = match &sort.tasks {
                    Some(tasks) => {
                        ensure_non_empty(&label, "tasks", tasks)?;
                        ensure_known_tasks(cfg, &label, tasks)?;
                        tasks.iter().collect()
                    }
                    None => cfg.task.keys().collect(),
                };
                for name in scope {
                    let has_key = cfg
                        .task
                        .get(name)
                        .is_some_and(|task| task.keys.contains_key(&sort.key));
                    if !has_key {
                        return Err(TaskweaveError::ConfigError(format!(
                            "{label}: task '{name}' has no key '{}'",
                            sort.key
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskweaveError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn rule_label(position: usize, rule: &RuleConfig) -> String {
    match &rule.settings().name {
        Some(name) => format!("rule #{} ('{name}')", position + 1),
        None => format!("rule #{}", position + 1),
    }
}

fn validate_settings(label: &str, rule: &RuleConfig) -> Result<()> {
    let weight = rule.settings().weight;
    if !weight.is_finite() {
        return Err(TaskweaveError::ConfigError(format!(
            "{label}: weight must be a finite number (got {weight})"
        )));
    }
    Ok(())
}

fn ensure_non_empty(label: &str, field: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(TaskweaveError::ConfigError(format!(
            "{label}: `{field}` must list at least one task"
        )));
    }
    Ok(())
}

fn ensure_known_tasks(cfg: &RawConfigFile, label: &str, names: &[String]) -> Result<()> {
    for name in names {
        if !cfg.task.contains_key(name) {
            return Err(TaskweaveError::ConfigError(format!(
                "{label}: unknown task '{name}'"
            )));
        }
    }
    Ok(())
}
