// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::SortOrder;

/// Plan file exactly as deserialized from TOML.
///
/// ```toml
/// [task.fetch]
/// cmd = "curl -O https://example.com/data.csv"
/// keys = { stage = 1 }
///
/// [task.build]
/// cmd = "make"
/// keys = { stage = 2 }
///
/// [[rule]]
/// kind = "dependency"
/// predecessors = ["fetch"]
/// successors = ["build"]
/// must_apply = true
///
/// [[rule]]
/// kind = "sort"
/// key = "stage"
/// ```
///
/// Nothing here has been checked yet; [`ConfigFile`] is the validated form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// All rules from `[[rule]]`, in file order.
    #[serde(default)]
    pub rule: Vec<RuleConfig>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run.
    pub cmd: String,

    /// Integer keys that sort rules can group by, e.g. `{ stage = 2 }`.
    #[serde(default)]
    pub keys: BTreeMap<String, i64>,
}

/// One `[[rule]]` entry, discriminated by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleConfig {
    Dependency(DependencyRuleConfig),
    Sort(SortRuleConfig),
}

impl RuleConfig {
    pub fn settings(&self) -> &RuleSettingsConfig {
        match self {
            RuleConfig::Dependency(rule) => &rule.settings,
            RuleConfig::Sort(rule) => &rule.settings,
        }
    }
}

/// Fields every rule kind accepts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSettingsConfig {
    /// Optional label used in logs and errors.
    #[serde(default)]
    pub name: Option<String>,

    /// Higher weights are applied first.
    #[serde(default)]
    pub weight: f64,

    /// Fail compilation instead of dropping an edge that would close a cycle.
    #[serde(default)]
    pub must_apply: bool,
}

/// `kind = "dependency"`: every predecessor runs before every successor.
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyRuleConfig {
    pub predecessors: Vec<String>,
    pub successors: Vec<String>,

    #[serde(flatten)]
    pub settings: RuleSettingsConfig,
}

/// `kind = "sort"`: group tasks by an integer key and chain the groups.
#[derive(Debug, Clone, Deserialize)]
pub struct SortRuleConfig {
    /// Name of the entry in each task's `keys` table.
    pub key: String,

    /// Tasks the rule applies to; all tasks when omitted.
    #[serde(default)]
    pub tasks: Option<Vec<String>>,

    #[serde(default)]
    pub order: SortOrder,

    #[serde(flatten)]
    pub settings: RuleSettingsConfig,
}

/// Validated plan file.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (or the
/// loader), so every rule here references known tasks.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub task: BTreeMap<String, TaskConfig>,
    pub rule: Vec<RuleConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        task: BTreeMap<String, TaskConfig>,
        rule: Vec<RuleConfig>,
    ) -> Self {
        Self { task, rule }
    }
}
