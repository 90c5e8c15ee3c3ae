// src/rules/sort.rs

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::rules::live::{Revision, TaskSet};
use crate::rules::{DependencyBuilder, Rule, RuleSettings, add_cross_product};
use crate::types::SortOrder;

type KeyFn<T, K> = Arc<dyn Fn(&T) -> K + Send + Sync>;
type CompareFn<K> = Arc<dyn Fn(&K, &K) -> Ordering + Send + Sync>;

/// Groups tasks by a key and chains the groups in key order.
///
/// Every member of a group runs before every member of the next group;
/// members of the same group stay mutually unordered. Without an explicit
/// task subset the rule covers every task being compiled.
pub struct SortRule<T, K> {
    tasks: Option<TaskSet<T>>,
    key: KeyFn<T, K>,
    compare: CompareFn<K>,
    order: SortOrder,
    settings: RuleSettings,
    keys_changed: Revision,
    label: Option<String>,
}

impl<T, K> SortRule<T, K>
where
    T: Clone + PartialEq,
{
    /// Sort by a key with a natural ordering.
    pub fn by_key<F>(key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord + 'static,
    {
        Self::with_comparer(key, K::cmp)
    }

    /// Sort by a key with a caller-supplied comparer. Keys that compare
    /// `Equal` share a group.
    pub fn with_comparer<F, C>(key: F, compare: C) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self {
            tasks: None,
            key: Arc::new(key),
            compare: Arc::new(compare),
            order: SortOrder::Ascending,
            settings: RuleSettings::default(),
            keys_changed: Revision::new(),
            label: None,
        }
    }

    /// Restrict the rule to a subset of tasks.
    pub fn over(mut self, tasks: impl Into<TaskSet<T>>) -> Self {
        self.tasks = Some(tasks.into());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
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

    /// Report that the key of one or more tasks changed.
    pub fn notify_keys_changed(&self) {
        self.keys_changed.bump();
    }

    /// Handle a host can keep (e.g. inside its tasks) to report key changes
    /// without holding on to the rule itself.
    pub fn key_change_handle(&self) -> Revision {
        self.keys_changed.clone()
    }

    /// Group `tasks` by key, ordered by the comparer and `order`.
    ///
    /// Grouping keeps the input order inside each group.
    pub fn groups(&self, tasks: &[T]) -> Vec<Vec<T>> {
        let mut keyed: Vec<(K, &T)> = tasks.iter().map(|t| ((self.key)(t), t)).collect();
        keyed.sort_by(|(a, _), (b, _)| self.order.apply((self.compare)(a, b)));

        let mut groups: Vec<(K, Vec<T>)> = Vec::new();
        for (key, task) in keyed {
            match groups.last_mut() {
                Some((group_key, members)) if (self.compare)(group_key, &key) == Ordering::Equal => {
                    members.push(task.clone());
                }
                _ => groups.push((key, vec![task.clone()])),
            }
        }

        groups.into_iter().map(|(_, members)| members).collect()
    }
}

impl<T, K> fmt::Debug for SortRule<T, K>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortRule")
            .field("tasks", &self.tasks)
            .field("order", &self.order)
            .field("settings", &self.settings)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<T, K> Rule<T> for SortRule<T, K>
where
    T: Clone + PartialEq + fmt::Debug + Send + Sync,
{
    fn name(&self) -> String {
        match (&self.label, &self.tasks) {
            (Some(label), _) => label.clone(),
            (None, Some(tasks)) => format!("sort {:?} {:?}", tasks.items(), self.order),
            (None, None) => format!("sort all tasks {:?}", self.order),
        }
    }

    fn weight(&self) -> f64 {
        self.settings.weight
    }

    fn must_apply(&self) -> bool {
        self.settings.must_apply
    }

    fn is_valid(&self) -> bool {
        match &self.tasks {
            Some(tasks) => !tasks.is_empty(),
            None => true,
        }
    }

    fn revision(&self) -> u64 {
        let subset = self.tasks.as_ref().map_or(0, TaskSet::revision);
        subset + self.keys_changed.current()
    }

    fn apply(&self, builder: &mut dyn DependencyBuilder<T>) -> Result<()> {
        let tasks: Vec<T> = match &self.tasks {
            Some(subset) => subset.items().into_owned(),
            None => builder.tasks().to_vec(),
        };

        let groups = self.groups(&tasks);
        let mut added = 0;
        for pair in groups.windows(2) {
            added += add_cross_product(builder, &pair[0], &pair[1], self)?;
        }

        debug!(
            rule = %self.name(),
            groups = groups.len(),
            added,
            "sort rule applied"
        );
        Ok(())
    }
}
