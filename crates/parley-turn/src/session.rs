//! Arbiter session - runs one [`TurnArbiter`] on its own task.
//!
//! A session owns exactly one ordered stream of utterances. Utterances are
//! queued on a bounded channel and arbitrated one at a time in arrival
//! order; the task never waits on the dialogue consumer. Sessions share
//! nothing, so any number of them can run side by side.
//!
//! ```text
//!   ASR ──submit──▶ [queue] ──▶ TurnArbiter ──▶ DialogueSink
//!                                   │  ▲
//!              stop_output ◀────────┘  └──── OutputTracker ◀── synthesis pipeline
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use parley_core::{
    ArbiterConfig, ArbiterEvent, Decision, DialogueSink, OutputState, SpeechOutput, Utterance,
};

use crate::arbiter::{TurnArbiter, publish};
use crate::error::SessionError;
use crate::registry::SpeakerRegistry;
use crate::tracker::OutputTracker;

/// Per-session decision tally, returned on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub utterances: u64,
    pub discarded: u64,
    pub deferred: u64,
    pub dispatched: u64,
    pub interrupted: u64,
}

impl SessionStats {
    const fn record(&mut self, decision: &Decision) {
        self.utterances += 1;
        match decision {
            Decision::Discard { .. } => self.discarded += 1,
            Decision::Defer { .. } => self.deferred += 1,
            Decision::Dispatch { .. } => self.dispatched += 1,
            Decision::Interrupt { .. } => self.interrupted += 1,
        }
    }
}

/// Entry point for spawning sessions.
pub struct ArbiterSession;

impl ArbiterSession {
    /// Spawn a session task on the current tokio runtime.
    ///
    /// Returns the handle and a receiver for [`ArbiterEvent`]s. The receiver
    /// may be dropped if nobody is interested in events.
    pub fn spawn(
        config: ArbiterConfig,
        output: Arc<dyn SpeechOutput>,
        dialogue: Arc<dyn DialogueSink>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<ArbiterEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (utterance_tx, utterance_rx) = mpsc::channel(config.session_queue_capacity());

        let registry = SpeakerRegistry::new();
        let tracker = OutputTracker::new();
        let state_rx = tracker.subscribe();

        let arbiter = TurnArbiter::new(config, output, dialogue)
            .with_registry(registry.clone())
            .with_tracker(tracker.clone())
            .with_events(event_tx.clone());

        tracing::info!("Starting arbiter session");
        let task = tokio::spawn(run(arbiter, utterance_rx, state_rx, event_tx.clone()));

        let handle = SessionHandle {
            utterance_tx,
            registry,
            tracker,
            event_tx,
            task,
        };
        (handle, event_rx)
    }
}

/// Owner handle for a running session.
pub struct SessionHandle {
    utterance_tx: mpsc::Sender<Utterance>,
    registry: SpeakerRegistry,
    tracker: OutputTracker,
    event_tx: mpsc::UnboundedSender<ArbiterEvent>,
    task: JoinHandle<SessionStats>,
}

impl SessionHandle {
    /// Queue an utterance, waiting for space if the queue is full.
    pub async fn submit(&self, utterance: Utterance) -> Result<(), SessionError> {
        self.utterance_tx
            .send(utterance)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Queue an utterance without waiting.
    pub fn try_submit(&self, utterance: Utterance) -> Result<(), SessionError> {
        self.utterance_tx.try_send(utterance).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::Busy,
            mpsc::error::TrySendError::Closed(_) => SessionError::Closed,
        })
    }

    /// A cloneable submitter for ASR tasks that should not own the session.
    pub fn submitter(&self) -> UtteranceSubmitter {
        UtteranceSubmitter {
            tx: self.utterance_tx.clone(),
        }
    }

    /// Attribute an audio source to a participant.
    pub fn register_track(&self, source_id: impl Into<String>, identity: impl Into<String>) {
        let source_id = source_id.into();
        let identity = identity.into();
        if self.registry.register_track(source_id.clone(), identity.clone()) {
            publish(&self.event_tx, ArbiterEvent::TrackRegistered { source_id, identity });
        }
    }

    /// The tracker the synthesis pipeline reports lifecycle signals to.
    pub fn tracker(&self) -> OutputTracker {
        self.tracker.clone()
    }

    pub fn registry(&self) -> SpeakerRegistry {
        self.registry.clone()
    }

    /// Stop accepting utterances, drain the queue, and wait for the task.
    ///
    /// Outstanding [`UtteranceSubmitter`]s keep the queue open; drop them first.
    pub async fn shutdown(self) -> Result<SessionStats, SessionError> {
        let Self {
            utterance_tx, task, ..
        } = self;
        drop(utterance_tx);
        let stats = task
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))?;
        tracing::info!(
            utterances = stats.utterances,
            dispatched = stats.dispatched,
            interrupted = stats.interrupted,
            "Arbiter session stopped"
        );
        Ok(stats)
    }
}

/// Cloneable utterance submitter.
#[derive(Debug, Clone)]
pub struct UtteranceSubmitter {
    tx: mpsc::Sender<Utterance>,
}

impl UtteranceSubmitter {
    pub async fn submit(&self, utterance: Utterance) -> Result<(), SessionError> {
        self.tx.send(utterance).await.map_err(|_| SessionError::Closed)
    }
}

async fn run(
    mut arbiter: TurnArbiter,
    mut utterances: mpsc::Receiver<Utterance>,
    mut state_rx: watch::Receiver<OutputState>,
    event_tx: mpsc::UnboundedSender<ArbiterEvent>,
) -> SessionStats {
    let mut stats = SessionStats::default();
    let mut watching = true;

    loop {
        tokio::select! {
            changed = state_rx.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let state = *state_rx.borrow_and_update();
                publish(&event_tx, ArbiterEvent::OutputStateChanged { state });
            }
            next = utterances.recv() => {
                let Some(utterance) = next else { break };
                let decision = arbiter.on_utterance(&utterance);
                stats.record(&decision);
            }
        }
    }

    stats
}
