// src/rules/live.rs

//! Change tracking primitives used by rules.
//!
//! A [`Revision`] is a shared monotonic counter. Anything observable (a
//! [`LiveSet`], a sort rule's keys) bumps it on change, and the rule registry
//! compares the value it saw at the last compilation with the current one.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared change counter.
#[derive(Debug, Clone, Default)]
pub struct Revision(Arc<AtomicU64>);

impl Revision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change.
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// A shared, observable set of tasks.
///
/// Clones share the same storage, so a host can keep one handle and mutate it
/// while a rule holds another. Every structural change bumps the set's
/// [`Revision`], which marks the owning scheduler dirty.
#[derive(Debug, Clone)]
pub struct LiveSet<T> {
    items: Arc<RwLock<Vec<T>>>,
    revision: Revision,
}

impl<T> Default for LiveSet<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
            revision: Revision::new(),
        }
    }
}

impl<T: Clone + PartialEq> LiveSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `item` unless an equal item is already present.
    pub fn insert(&self, item: T) -> bool {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.contains(&item) {
            return false;
        }
        items.push(item);
        self.revision.bump();
        true
    }

    pub fn remove(&self, item: &T) -> bool {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.iter().position(|x| x == item) {
            Some(pos) => {
                items.remove(pos);
                self.revision.bump();
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if !items.is_empty() {
            items.clear();
            self.revision.bump();
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents, in insertion order.
    pub fn to_vec(&self) -> Vec<T> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision.current()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for LiveSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let set = LiveSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// Task set referenced by a rule: either fixed at construction time or bound
/// to a [`LiveSet`].
#[derive(Debug, Clone)]
pub enum TaskSet<T> {
    Fixed(Vec<T>),
    Live(LiveSet<T>),
}

impl<T: Clone + PartialEq> TaskSet<T> {
    pub fn items(&self) -> Cow<'_, [T]> {
        match self {
            TaskSet::Fixed(items) => Cow::Borrowed(items.as_slice()),
            TaskSet::Live(set) => Cow::Owned(set.to_vec()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TaskSet::Fixed(items) => items.is_empty(),
            TaskSet::Live(set) => set.is_empty(),
        }
    }

    /// Change counter; fixed sets never change.
    pub fn revision(&self) -> u64 {
        match self {
            TaskSet::Fixed(_) => 0,
            TaskSet::Live(set) => set.revision(),
        }
    }
}

impl<T> From<Vec<T>> for TaskSet<T> {
    fn from(items: Vec<T>) -> Self {
        TaskSet::Fixed(items)
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for TaskSet<T> {
    fn from(items: [T; N]) -> Self {
        TaskSet::Fixed(items.to_vec())
    }
}

impl<T> From<LiveSet<T>> for TaskSet<T> {
    fn from(set: LiveSet<T>) -> Self {
        TaskSet::Live(set)
    }
}
