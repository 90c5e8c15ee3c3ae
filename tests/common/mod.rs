#![allow(dead_code)]

pub use taskweave_test_utils::recording_action::{Event, RecordingAction};
pub use taskweave_test_utils::{builders, init_tracing, with_timeout, with_timeout_of};

use taskweave::scheduler::Scheduler;

/// Scheduler with `tasks` registered in order and no rules.
pub fn scheduler_with(tasks: &[&'static str]) -> Scheduler<&'static str> {
    let mut scheduler = Scheduler::new();
    for task in tasks {
        scheduler.add_task(*task).unwrap();
    }
    scheduler
}

/// Position of `task` in `order`; panics if it is missing.
pub fn index_in<T: PartialEq + std::fmt::Debug>(order: &[T], task: &T) -> usize {
    order
        .iter()
        .position(|t| t == task)
        .unwrap_or_else(|| panic!("{task:?} missing from {order:?}"))
}
