//! Output lifecycle tracker - the single writer of the agent's output state.
//!
//! The synthesis pipeline reports `started` / `completed` / `interrupted`
//! as it streams a reply; the arbiter reads the state before every decision
//! and reports `interrupted` itself right after it stops output. Signals can
//! arrive from any task. The last write wins and nothing is queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parley_core::OutputState;
use tokio::sync::watch;

/// How many times each lifecycle signal was observed.
///
/// Completion and interruption land on the same not-speaking state; the
/// counters are where they stay distinguishable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCounters {
    pub started: u64,
    pub completed: u64,
    pub interrupted: u64,
}

#[derive(Debug)]
struct Inner {
    state: watch::Sender<OutputState>,
    started: AtomicU64,
    completed: AtomicU64,
    interrupted: AtomicU64,
}

/// Shared output state handle. Clones observe and mutate the same state.
#[derive(Debug, Clone)]
pub struct OutputTracker {
    inner: Arc<Inner>,
}

impl OutputTracker {
    /// Create a tracker (initially idle).
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(OutputState::Idle);
        Self {
            inner: Arc::new(Inner {
                state,
                started: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                interrupted: AtomicU64::new(0),
            }),
        }
    }

    /// Speech output began streaming.
    pub fn notify_started(&self) {
        self.inner.started.fetch_add(1, Ordering::Relaxed);
        let previous = self.inner.state.send_replace(OutputState::Speaking);
        tracing::debug!(previous = %previous, "Speech output started");
    }

    /// Speech output finished naturally.
    pub fn notify_completed(&self) {
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
        let previous = self.inner.state.send_replace(OutputState::Idle);
        tracing::debug!(previous = %previous, "Speech output completed");
    }

    /// Speech output was cut short.
    pub fn notify_interrupted(&self) {
        self.inner.interrupted.fetch_add(1, Ordering::Relaxed);
        let previous = self.inner.state.send_replace(OutputState::Interrupted);
        tracing::info!(previous = %previous, "Speech output interrupted");
    }

    /// Latest observed state.
    pub fn state(&self) -> OutputState {
        *self.inner.state.borrow()
    }

    pub fn is_speaking(&self) -> bool {
        self.state().is_speaking()
    }

    /// Follow state transitions without polling.
    pub fn subscribe(&self) -> watch::Receiver<OutputState> {
        self.inner.state.subscribe()
    }

    pub fn counters(&self) -> OutputCounters {
        OutputCounters {
            started: self.inner.started.load(Ordering::Relaxed),
            completed: self.inner.completed.load(Ordering::Relaxed),
            interrupted: self.inner.interrupted.load(Ordering::Relaxed),
        }
    }
}

impl Default for OutputTracker {
    fn default() -> Self {
        Self::new()
    }
}
