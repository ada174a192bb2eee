//! FIFO of pending fights between detection and resolution

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::core::types::AgentId;

/// Two agents detected within combat range of each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FightTask {
    pub attacker: AgentId,
    pub defender: AgentId,
}

impl FightTask {
    pub fn new(attacker: AgentId, defender: AgentId) -> Self {
        Self { attacker, defender }
    }
}

/// Unbounded producer/consumer queue
///
/// `push` never blocks. `pop_timeout` blocks until a task arrives, the stop
/// flag is raised, or the wait elapses.
#[derive(Debug, Default)]
pub struct FightQueue {
    tasks: Mutex<VecDeque<FightTask>>,
    available: Condvar,
}

impl FightQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<FightTask>> {
        // A VecDeque of Copy pairs cannot be left half-updated
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, task: FightTask) {
        self.lock().push_back(task);
        self.available.notify_one();
    }

    /// Take the oldest task, waiting at most `wait`
    ///
    /// Returns immediately once `stop` is set, but a stop never hides tasks
    /// that are already queued.
    pub fn pop_timeout(&self, wait: Duration, stop: &AtomicBool) -> Option<FightTask> {
        let guard = self.lock();
        let (mut tasks, _) = self
            .available
            .wait_timeout_while(guard, wait, |tasks| {
                tasks.is_empty() && !stop.load(Ordering::SeqCst)
            })
            .unwrap_or_else(PoisonError::into_inner);
        tasks.pop_front()
    }

    pub fn try_pop(&self) -> Option<FightTask> {
        self.lock().pop_front()
    }

    /// Wake every blocked consumer so it can re-check the stop flag
    pub fn wake_all(&self) {
        // Taking the lock orders this wake-up after any in-flight predicate check
        drop(self.lock());
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
