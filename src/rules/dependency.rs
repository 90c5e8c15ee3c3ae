// src/rules/dependency.rs

use std::fmt::Debug;

use tracing::debug;

use crate::errors::Result;
use crate::rules::live::TaskSet;
use crate::rules::{DependencyBuilder, Rule, RuleSettings, add_cross_product};

/// "Every predecessor runs before every successor."
///
/// Either side may be a fixed list or a [`LiveSet`](crate::rules::LiveSet);
/// changes to a live side are reported through [`Rule::revision`].
#[derive(Debug, Clone)]
pub struct DependencyRule<T> {
    predecessors: TaskSet<T>,
    successors: TaskSet<T>,
    settings: RuleSettings,
    label: Option<String>,
}

impl<T> DependencyRule<T>
where
    T: Clone + PartialEq + Debug,
{
    pub fn new(predecessors: impl Into<TaskSet<T>>, successors: impl Into<TaskSet<T>>) -> Self {
        Self {
            predecessors: predecessors.into(),
            successors: successors.into(),
            settings: RuleSettings::default(),
            label: None,
        }
    }

    /// Single edge `predecessor -> successor`.
    pub fn between(predecessor: T, successor: T) -> Self {
        Self::new(vec![predecessor], vec![successor])
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.settings.weight = weight;
        self
    }

    pub fn must_apply(mut self, must_apply: bool) -> Self {
        self.settings.must_apply = must_apply;
        self
    }

    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn predecessors(&self) -> &TaskSet<T> {
        &self.predecessors
    }

    pub fn successors(&self) -> &TaskSet<T> {
        &self.successors
    }
}

impl<T> Rule<T> for DependencyRule<T>
where
    T: Clone + PartialEq + Debug + Send + Sync,
{
    fn name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!(
                "{:?} before {:?}",
                self.predecessors.items(),
                self.successors.items()
            ),
        }
    }

    fn weight(&self) -> f64 {
        self.settings.weight
    }

    fn must_apply(&self) -> bool {
        self.settings.must_apply
    }

    fn is_valid(&self) -> bool {
        !self.predecessors.is_empty() && !self.successors.is_empty()
    }

    fn revision(&self) -> u64 {
        self.predecessors.revision() + self.successors.revision()
    }

    fn apply(&self, builder: &mut dyn DependencyBuilder<T>) -> Result<()> {
        let predecessors = self.predecessors.items();
        let successors = self.successors.items();
        let added = add_cross_product(builder, &predecessors, &successors, self)?;
        debug!(
            rule = %self.name(),
            requested = predecessors.len() * successors.len(),
            added,
            "dependency rule applied"
        );
        Ok(())
    }
}
