// src/scheduler/registry.rs

//! Mutation-observing task and rule containers.
//!
//! Both registries keep a structural revision that is bumped on every add,
//! insert, remove, replace or clear. The scheduler records the revisions it
//! compiled against; any difference means the cached graph is stale.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::trace;

use crate::errors::{Result, TaskweaveError};
use crate::rules::Rule;

/// Ordered task list without duplicates.
#[derive(Debug, Clone)]
pub struct TaskRegistry<T> {
    items: Vec<T>,
    revision: u64,
}

impl<T> Default for TaskRegistry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }
}

impl<T> TaskRegistry<T>
where
    T: Clone + PartialEq + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision += 1;
        trace!(revision = self.revision, "task registry changed");
    }

    fn ensure_absent(&self, task: &T, skip: Option<usize>) -> Result<()> {
        let clash = self
            .items
            .iter()
            .enumerate()
            .any(|(i, existing)| Some(i) != skip && existing == task);
        if clash {
            return Err(TaskweaveError::DuplicateTask(format!("{task:?}")));
        }
        Ok(())
    }

    /// Append a task. Fails if an equal task is already registered.
    pub fn add(&mut self, task: T) -> Result<()> {
        self.ensure_absent(&task, None)?;
        self.items.push(task);
        self.touch();
        Ok(())
    }

    /// Insert a task at `index`. Fails on duplicates or an out-of-range index.
    pub fn insert(&mut self, index: usize, task: T) -> Result<()> {
        if index > self.items.len() {
            return Err(TaskweaveError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.ensure_absent(&task, None)?;
        self.items.insert(index, task);
        self.touch();
        Ok(())
    }

    /// Replace the task at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, task: T) -> Result<T> {
        if index >= self.items.len() {
            return Err(TaskweaveError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.ensure_absent(&task, Some(index))?;
        let previous = std::mem::replace(&mut self.items[index], task);
        self.touch();
        Ok(previous)
    }

    pub fn remove(&mut self, task: &T) -> bool {
        match self.position(task) {
            Some(index) => {
                self.items.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    pub fn contains(&self, task: &T) -> bool {
        self.items.contains(task)
    }

    pub fn position(&self, task: &T) -> Option<usize> {
        self.items.iter().position(|t| t == task)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Ordered rule list. Rules are identified by their `Arc` allocation.
#[derive(Debug)]
pub struct RuleRegistry<T> {
    rules: Vec<Arc<dyn Rule<T>>>,
    revision: u64,
}

impl<T> Default for RuleRegistry<T> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            revision: 0,
        }
    }
}

fn same_rule<T>(a: &Arc<dyn Rule<T>>, b: &Arc<dyn Rule<T>>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl<T> RuleRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision += 1;
        trace!(revision = self.revision, "rule registry changed");
    }

    pub fn add(&mut self, rule: Arc<dyn Rule<T>>) {
        self.rules.push(rule);
        self.touch();
    }

    pub fn remove(&mut self, rule: &Arc<dyn Rule<T>>) -> bool {
        match self.rules.iter().position(|r| same_rule(r, rule)) {
            Some(index) => {
                self.rules.remove(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, rule: &Arc<dyn Rule<T>>) -> bool {
        self.rules.iter().any(|r| same_rule(r, rule))
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.touch();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule<T>>> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Arc<dyn Rule<T>>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current change counter of every member rule, in list order.
    pub fn member_revisions(&self) -> Vec<u64> {
        self.rules.iter().map(|r| r.revision()).collect()
    }
}
