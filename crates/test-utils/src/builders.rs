#![allow(dead_code)]

use std::collections::BTreeMap;

use taskweave::config::{
    ConfigFile, DependencyRuleConfig, RawConfigFile, RuleConfig, RuleSettingsConfig,
    SortRuleConfig, TaskConfig,
};
use taskweave::types::SortOrder;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_rule(mut self, rule: RuleConfig) -> Self {
        self.config.rule.push(rule);
        self
    }

    /// Shorthand for a single-edge dependency rule with default settings.
    pub fn with_dependency(self, predecessor: &str, successor: &str) -> Self {
        self.with_rule(RuleConfigBuilder::dependency(&[predecessor], &[successor]).build())
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                keys: BTreeMap::new(),
            },
        }
    }

    pub fn key(mut self, name: &str, value: i64) -> Self {
        self.task.keys.insert(name.to_string(), value);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Builder for `RuleConfig`.
pub struct RuleConfigBuilder {
    rule: RuleConfig,
}

impl RuleConfigBuilder {
    pub fn dependency(predecessors: &[&str], successors: &[&str]) -> Self {
        Self {
            rule: RuleConfig::Dependency(DependencyRuleConfig {
                predecessors: predecessors.iter().map(|s| s.to_string()).collect(),
                successors: successors.iter().map(|s| s.to_string()).collect(),
                settings: RuleSettingsConfig::default(),
            }),
        }
    }

    pub fn sort(key: &str) -> Self {
        Self {
            rule: RuleConfig::Sort(SortRuleConfig {
                key: key.to_string(),
                tasks: None,
                order: SortOrder::Ascending,
                settings: RuleSettingsConfig::default(),
            }),
        }
    }

    /// Restrict a sort rule to `tasks`. No effect on dependency rules.
    pub fn tasks(mut self, tasks: &[&str]) -> Self {
        if let RuleConfig::Sort(sort) = &mut self.rule {
            sort.tasks = Some(tasks.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    /// Set a sort rule's order. No effect on dependency rules.
    pub fn order(mut self, order: SortOrder) -> Self {
        if let RuleConfig::Sort(sort) = &mut self.rule {
            sort.order = order;
        }
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.settings_mut().weight = weight;
        self
    }

    pub fn must_apply(mut self, val: bool) -> Self {
        self.settings_mut().must_apply = val;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.settings_mut().name = Some(name.to_string());
        self
    }

    fn settings_mut(&mut self) -> &mut RuleSettingsConfig {
        match &mut self.rule {
            RuleConfig::Dependency(dep) => &mut dep.settings,
            RuleConfig::Sort(sort) => &mut sort.settings,
        }
    }

    pub fn build(self) -> RuleConfig {
        self.rule
    }
}
