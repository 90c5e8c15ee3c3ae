// src/scheduler/controller.rs

//! Fluent "before / after / at start / at end" authoring on top of
//! [`Scheduler`].
//!
//! ```ignore
//! scheduler
//!     .plan_task("deploy")?
//!     .after("build")?
//!     .must_apply()
//!     .after("test")?
//!     .at_end();
//! ```
//!
//! Every call issues an ordinary rule; the controller itself holds no state
//! the scheduler does not already see.

use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, TaskweaveError};
use crate::rules::{DependencyRule, Rule, RuleSettings, SortRule};
use crate::scheduler::{Scheduler, TaskItem};

/// Handle returned by [`Scheduler::plan_task`].
///
/// `weight` and `must_apply` only affect rules issued by later calls.
pub struct TaskController<'s, T: TaskItem> {
    scheduler: &'s mut Scheduler<T>,
    task: T,
    settings: RuleSettings,
    issued: Vec<Arc<dyn Rule<T>>>,
}

impl<'s, T: TaskItem> TaskController<'s, T> {
    pub(crate) fn new(scheduler: &'s mut Scheduler<T>, task: T) -> Result<Self> {
        ensure_registered(scheduler, &task)?;
        Ok(Self {
            scheduler,
            task,
            settings: RuleSettings::default(),
            issued: Vec::new(),
        })
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    /// Rules issued through this controller so far, in call order.
    pub fn issued(&self) -> &[Arc<dyn Rule<T>>] {
        &self.issued
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.settings.weight = weight;
        self
    }

    pub fn must_apply(mut self) -> Self {
        self.settings.must_apply = true;
        self
    }

    /// The controlled task runs before `other`.
    pub fn before(self, other: T) -> Result<Self> {
        let task = self.task.clone();
        self.relate(task, other)
    }

    /// The controlled task runs after `other`.
    pub fn after(self, other: T) -> Result<Self> {
        let task = self.task.clone();
        self.relate(other, task)
    }

    /// The controlled task runs before every other task, including tasks
    /// registered later.
    pub fn at_start(self) -> Self {
        let pinned = self.task.clone();
        let rule = SortRule::by_key(move |t: &T| u8::from(*t != pinned))
            .with_weight(self.settings.weight)
            .must_apply(self.settings.must_apply)
            .named(format!("{:?} at start", self.task));
        self.issue(Arc::new(rule))
    }

    /// The controlled task runs after every other task, including tasks
    /// registered later.
    pub fn at_end(self) -> Self {
        let pinned = self.task.clone();
        let rule = SortRule::by_key(move |t: &T| u8::from(*t == pinned))
            .with_weight(self.settings.weight)
            .must_apply(self.settings.must_apply)
            .named(format!("{:?} at end", self.task));
        self.issue(Arc::new(rule))
    }

    fn relate(self, predecessor: T, successor: T) -> Result<Self> {
        if predecessor == successor {
            return Err(TaskweaveError::SelfDependency(format!("{predecessor:?}")));
        }
        let other = if predecessor == self.task {
            &successor
        } else {
            &predecessor
        };
        ensure_registered(self.scheduler, other)?;

        let rule = DependencyRule::between(predecessor, successor)
            .with_weight(self.settings.weight)
            .must_apply(self.settings.must_apply);
        Ok(self.issue(Arc::new(rule)))
    }

    fn issue(mut self, rule: Arc<dyn Rule<T>>) -> Self {
        debug!(task = ?self.task, rule = %rule.name(), "controller issued rule");
        self.scheduler.add_shared_rule(Arc::clone(&rule));
        self.issued.push(rule);
        self
    }
}

fn ensure_registered<T: TaskItem>(scheduler: &mut Scheduler<T>, task: &T) -> Result<()> {
    if scheduler.tasks().contains(task) {
        return Ok(());
    }
    scheduler.add_task(task.clone())?;
    debug!(task = ?task, "controller registered task");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_and_after_register_missing_tasks() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.plan_task("b").unwrap().after("a").unwrap().before("c").unwrap();

        assert_eq!(s.tasks().as_slice(), &["b", "a", "c"]);
        assert_eq!(s.plan().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn settings_apply_to_later_calls_only() {
        let mut s: Scheduler<&str> = Scheduler::new();
        let controller = s
            .plan_task("x")
            .unwrap()
            .before("y")
            .unwrap()
            .weight(3.0)
            .must_apply()
            .after("z")
            .unwrap();

        let issued = controller.issued();
        assert_eq!(issued.len(), 2);
        assert_eq!(issued[0].weight(), 0.0);
        assert!(!issued[0].must_apply());
        assert_eq!(issued[1].weight(), 3.0);
        assert!(issued[1].must_apply());
    }

    #[test]
    fn at_start_and_at_end_cover_later_tasks() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.plan_task("setup").unwrap().at_start();
        s.plan_task("teardown").unwrap().at_end();
        s.add_task("work").unwrap();

        let order = s.plan().unwrap();
        assert_eq!(order.first(), Some(&"setup"));
        assert_eq!(order.last(), Some(&"teardown"));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn planning_a_registered_task_does_not_add_it_twice() {
        let mut s: Scheduler<&str> = Scheduler::new();
        s.add_task("a").unwrap();
        s.add_task("b").unwrap();

        s.plan_task("a").unwrap().after("b").unwrap();

        assert_eq!(s.tasks().as_slice(), &["a", "b"]);
        assert_eq!(s.plan().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn relating_a_task_to_itself_fails() {
        let mut s: Scheduler<&str> = Scheduler::new();
        let err = s.plan_task("a").unwrap().before("a").err().unwrap();
        assert!(matches!(err, TaskweaveError::SelfDependency(_)));
    }
}
