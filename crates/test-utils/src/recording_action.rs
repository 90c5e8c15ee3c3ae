use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use taskweave::exec::{ActionFuture, TaskAction};

/// One observable step of a recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Started(T),
    Finished(T),
    /// The action gave up because its cancellation token fired.
    Interrupted(T),
}

#[derive(Debug)]
struct State<T> {
    events: Vec<Event<T>>,
    running: usize,
    peak: usize,
}

/// A fake task action that:
/// - records when each task starts and finishes
/// - optionally sleeps for a per-task delay
/// - optionally fails selected tasks
/// - tracks the peak number of actions in flight
/// - optionally stops its delay early when the token fires
///
/// Clones share the same recording.
#[derive(Clone)]
pub struct RecordingAction<T> {
    state: Arc<Mutex<State<T>>>,
    delays: Arc<HashMap<T, Duration>>,
    failing: Arc<HashSet<T>>,
    default_delay: Duration,
    honours_cancel: bool,
}

impl<T> RecordingAction<T>
where
    T: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                events: Vec::new(),
                running: 0,
                peak: 0,
            })),
            delays: Arc::new(HashMap::new()),
            failing: Arc::new(HashSet::new()),
            default_delay: Duration::ZERO,
            honours_cancel: false,
        }
    }

    /// Delay applied to every task without an explicit delay.
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_delay(mut self, task: T, delay: Duration) -> Self {
        Arc::make_mut(&mut self.delays).insert(task, delay);
        self
    }

    /// Race every delay against the cancellation token; a task whose token
    /// fires first records [`Event::Interrupted`] and returns an error.
    pub fn honouring_cancel(mut self) -> Self {
        self.honours_cancel = true;
        self
    }

    pub fn failing(mut self, task: T) -> Self {
        Arc::make_mut(&mut self.failing).insert(task);
        self
    }

    pub fn events(&self) -> Vec<Event<T>> {
        self.state.lock().unwrap().events.clone()
    }

    /// Tasks in the order their actions started.
    pub fn started(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(t) => Some(t),
                Event::Finished(_) | Event::Interrupted(_) => None,
            })
            .collect()
    }

    /// Tasks in the order their actions finished successfully.
    pub fn finished(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(t) => Some(t),
                Event::Started(_) | Event::Interrupted(_) => None,
            })
            .collect()
    }

    /// Tasks whose actions stopped early on cancellation.
    pub fn interrupted(&self) -> Vec<T> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Interrupted(t) => Some(t),
                Event::Started(_) | Event::Finished(_) => None,
            })
            .collect()
    }

    /// Position of `event` in the recording, if it happened.
    pub fn position(&self, event: &Event<T>) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Highest number of actions that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.state.lock().unwrap().peak
    }
}

impl<T> Default for RecordingAction<T>
where
    T: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> TaskAction<T, P> for RecordingAction<T>
where
    T: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    fn call(&self, task: T, _param: P, cancel: CancellationToken) -> ActionFuture {
        let state = Arc::clone(&self.state);
        let delay = self
            .delays
            .get(&task)
            .copied()
            .unwrap_or(self.default_delay);
        let fails = self.failing.contains(&task);
        let honours_cancel = self.honours_cancel;

        Box::pin(async move {
            {
                let mut guard = state.lock().unwrap();
                guard.events.push(Event::Started(task.clone()));
                guard.running += 1;
                guard.peak = guard.peak.max(guard.running);
            }

            let interrupted = if honours_cancel {
                tokio::select! {
                    _ = cancel.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                }
            } else {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                false
            };

            let mut guard = state.lock().unwrap();
            guard.running -= 1;
            if interrupted {
                guard.events.push(Event::Interrupted(task.clone()));
                anyhow::bail!("{task:?} interrupted by cancellation");
            }
            if fails {
                anyhow::bail!("{task:?} failed on purpose");
            }
            guard.events.push(Event::Finished(task));
            Ok(())
        })
    }
}
