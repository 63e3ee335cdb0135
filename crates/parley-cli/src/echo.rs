//! Simulated agent for replays.
//!
//! [`SimulatedSpeech`] stands in for a TTS player: a reply "plays" for a
//! fixed duration and then reports completion to the tracker, unless
//! `stop_output` cuts it short. [`run_echo_agent`] is the dialogue consumer:
//! it answers every dispatched turn with "Okay, you said: …".

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use parley_core::{OutputError, SpeechOutput, UserTurn};
use parley_turn::OutputTracker;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Reply text the echo agent speaks for `turn`.
pub fn reply_for(turn: &UserTurn) -> String {
    format!("Okay, you said: {}", turn.text)
}

/// Timer-driven stand-in for a speech output device.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSpeech {
    playing: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SimulatedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start "speaking" `text` for `duration`, replacing any reply in progress.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn play(&self, text: &str, duration: Duration, tracker: &OutputTracker) {
        tracing::info!(reply = text, "Agent speaking");
        tracker.notify_started();

        let tracker = tracker.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tracker.notify_completed();
        });

        let mut playing = self.playing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = playing.replace(handle) {
            previous.abort();
        }
    }

    /// Whether a reply timer is still running.
    pub fn is_playing(&self) -> bool {
        self.playing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl SpeechOutput for SimulatedSpeech {
    fn stop_output(&self) -> Result<(), OutputError> {
        let mut playing = self.playing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = playing.take() {
            handle.abort();
            tracing::debug!("Simulated reply cut short");
        }
        Ok(())
    }
}

/// Consume dispatched turns until the session closes, answering each one.
///
/// Returns the replies in the order they were spoken.
pub async fn run_echo_agent(
    mut turns: mpsc::UnboundedReceiver<UserTurn>,
    speech: SimulatedSpeech,
    tracker: OutputTracker,
    reply_duration: Duration,
) -> Vec<String> {
    let mut replies = Vec::new();
    while let Some(turn) = turns.recv().await {
        let reply = reply_for(&turn);
        speech.play(&reply, reply_duration, &tracker);
        replies.push(reply);
    }
    replies
}
