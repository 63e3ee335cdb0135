//! Turn arbiter - decides what each utterance means for the conversation.
//!
//! ```text
//!  agent state   verdict                    spacing         action
//!  ───────────   ───────────────────────    ─────────────   ──────────────────────
//!  any           Empty                      -               discard
//!  not speaking  FillerOnly / Meaningful    -               dispatch
//!  speaking      FillerOnly                 -               discard (keep talking)
//!  speaking      Meaningful (wake phrase)   -               stop, interrupt, dispatch
//!  speaking      Meaningful                 < pause window  defer
//!  speaking      Meaningful                 ≥ pause window  stop, interrupt, dispatch
//! ```
//!
//! "Spacing" is measured from the previous non-blank utterance, not from
//! the start of the current one. Rapid distinct utterances therefore read as
//! one continuing breath; this matches how the raw ASR callbacks arrive.
//!
//! The arbiter never blocks: stopping output and dispatching are both
//! commands handed to collaborators, and a failing collaborator is logged
//! and skipped so a user interruption always gets through.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;

use parley_core::{
    ArbiterConfig, ArbiterEvent, Decision, DialogueSink, DiscardReason, SpeechOutput, UserTurn,
    Utterance, Verdict,
};

use crate::classifier::TokenClassifier;
use crate::registry::SpeakerRegistry;
use crate::tracker::OutputTracker;

// ── Turn context ───────────────────────────────────────────────────

/// Timing and attribution carried from one utterance to the next.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    last_user_speech_at: Option<Instant>,
    active_speaker: Option<String>,
}

impl TurnContext {
    /// Arrival time of the most recent non-blank utterance.
    pub const fn last_user_speech_at(&self) -> Option<Instant> {
        self.last_user_speech_at
    }

    /// Most recently attributed speaker.
    ///
    /// Kept for observers only: the decision table never reads it, and an
    /// unattributed utterance is dispatched without a speaker rather than
    /// inheriting this one.
    pub fn active_speaker(&self) -> Option<&str> {
        self.active_speaker.as_deref()
    }

    /// Record a non-blank utterance and return the spacing from the previous one.
    fn observe(&mut self, at: Instant, speaker: Option<&str>) -> Option<Duration> {
        let elapsed = self
            .last_user_speech_at
            .map(|previous| at.saturating_duration_since(previous));
        self.last_user_speech_at = Some(at);
        if let Some(speaker) = speaker {
            self.active_speaker = Some(speaker.to_string());
        }
        elapsed
    }
}

// ── Arbiter ────────────────────────────────────────────────────────

/// The turn-taking state machine for one conversational session.
///
/// Owns the classifier and turn context; shares the speaker registry and
/// output tracker with the rest of the session.
pub struct TurnArbiter {
    classifier: TokenClassifier,
    registry: SpeakerRegistry,
    tracker: OutputTracker,
    output: Arc<dyn SpeechOutput>,
    dialogue: Arc<dyn DialogueSink>,
    context: TurnContext,
    event_tx: Option<mpsc::UnboundedSender<ArbiterEvent>>,
}

impl TurnArbiter {
    /// Create an arbiter with a fresh registry and tracker.
    pub fn new(
        config: ArbiterConfig,
        output: Arc<dyn SpeechOutput>,
        dialogue: Arc<dyn DialogueSink>,
    ) -> Self {
        Self {
            classifier: TokenClassifier::new(config),
            registry: SpeakerRegistry::new(),
            tracker: OutputTracker::new(),
            output,
            dialogue,
            context: TurnContext::default(),
            event_tx: None,
        }
    }

    /// Share an existing speaker registry (e.g. one the session notifier already fills).
    #[must_use]
    pub fn with_registry(mut self, registry: SpeakerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Share an existing output tracker (e.g. one the synthesis pipeline reports to).
    #[must_use]
    pub fn with_tracker(mut self, tracker: OutputTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Publish decisions and collaborator faults on `tx`.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<ArbiterEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub const fn registry(&self) -> &SpeakerRegistry {
        &self.registry
    }

    pub const fn tracker(&self) -> &OutputTracker {
        &self.tracker
    }

    pub const fn context(&self) -> &TurnContext {
        &self.context
    }

    pub const fn config(&self) -> &ArbiterConfig {
        self.classifier.config()
    }

    /// Arbitrate one utterance.
    ///
    /// Utterances from one session must be fed in arrival order; the pause
    /// window and the speaking check both depend on it.
    pub fn on_utterance(&mut self, utterance: &Utterance) -> Decision {
        let speaker = utterance
            .source_id()
            .and_then(|source_id| self.registry.resolve(source_id));

        let elapsed = if utterance.is_blank() {
            None
        } else {
            self.context
                .observe(utterance.arrived_at(), speaker.as_deref())
        };

        let verdict = self.classifier.classify(utterance);
        let speaking = self.tracker.is_speaking();

        let decision = match &verdict {
            Verdict::Empty { reason } => Decision::Discard {
                reason: (*reason).into(),
            },
            Verdict::FillerOnly { .. } | Verdict::Meaningful { .. } if !speaking => {
                let turn = build_turn(utterance, &verdict, speaker.clone(), false);
                self.deliver(&turn);
                Decision::Dispatch { turn }
            }
            Verdict::FillerOnly { .. } => Decision::Discard {
                reason: DiscardReason::FillerWhileSpeaking,
            },
            Verdict::Meaningful {
                via_wake_phrase: true,
                ..
            } => self.interrupt(build_turn(utterance, &verdict, speaker.clone(), true)),
            Verdict::Meaningful { .. } => match elapsed {
                Some(elapsed) if elapsed < self.config().pause_window() => {
                    Decision::Defer { elapsed }
                }
                _ => self.interrupt(build_turn(utterance, &verdict, speaker.clone(), true)),
            },
        };

        log_decision(&decision, &verdict, speaker.as_deref(), elapsed);
        self.emit(ArbiterEvent::Decided {
            speaker,
            verdict,
            decision: decision.clone(),
        });

        decision
    }

    /// Stop output, mark it interrupted, then hand the turn over.
    fn interrupt(&self, turn: UserTurn) -> Decision {
        if let Err(e) = self.output.stop_output() {
            tracing::warn!(error = %e, "Failed to stop speech output, dispatching anyway");
            self.emit(ArbiterEvent::StopFailed {
                error: e.to_string(),
            });
        }
        self.tracker.notify_interrupted();
        self.deliver(&turn);
        Decision::Interrupt { turn }
    }

    fn deliver(&self, turn: &UserTurn) {
        if let Err(e) = self.dialogue.dispatch(turn.clone()) {
            tracing::warn!(error = %e, text = %turn.text, "Dialogue consumer did not accept turn");
            self.emit(ArbiterEvent::DispatchFailed {
                error: e.to_string(),
            });
        }
    }

    fn emit(&self, event: ArbiterEvent) {
        if let Some(ref tx) = self.event_tx {
            publish(tx, event);
        }
    }
}

/// Best-effort event publication; a dropped receiver is not an error.
pub(crate) fn publish(tx: &mpsc::UnboundedSender<ArbiterEvent>, event: ArbiterEvent) {
    if tx.send(event).is_err() {
        tracing::trace!("Arbiter event receiver dropped");
    }
}

fn build_turn(
    utterance: &Utterance,
    verdict: &Verdict,
    speaker: Option<String>,
    interrupted_output: bool,
) -> UserTurn {
    UserTurn {
        speaker,
        text: verdict.text().unwrap_or_default().to_string(),
        original_text: utterance.text().to_string(),
        confidence: utterance.confidence(),
        source_id: utterance.source_id().map(str::to_string),
        tokens: utterance.tokens().to_vec(),
        received_at: utterance.received_time(),
        via_wake_phrase: verdict.is_wake(),
        interrupted_output,
        dispatched_at: Utc::now(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn log_decision(
    decision: &Decision,
    verdict: &Verdict,
    speaker: Option<&str>,
    elapsed: Option<Duration>,
) {
    let elapsed_ms = elapsed.map(|e| e.as_millis() as u64);
    match decision {
        Decision::Dispatch { turn } | Decision::Interrupt { turn } => tracing::info!(
            decision = decision.label(),
            verdict = verdict.label(),
            speaker = speaker.unwrap_or("-"),
            elapsed_ms,
            text = %turn.text,
            "User turn dispatched"
        ),
        Decision::Discard { reason } => tracing::debug!(
            decision = decision.label(),
            verdict = verdict.label(),
            speaker = speaker.unwrap_or("-"),
            reason = ?reason,
            "Utterance discarded"
        ),
        Decision::Defer { .. } => tracing::debug!(
            decision = decision.label(),
            verdict = verdict.label(),
            speaker = speaker.unwrap_or("-"),
            elapsed_ms,
            "User still talking, deferring"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{ChannelDialogue, NoopSpeechOutput, OutputState};

    fn arbiter() -> (TurnArbiter, mpsc::UnboundedReceiver<UserTurn>) {
        let (dialogue, rx) = ChannelDialogue::new();
        let arbiter = TurnArbiter::new(
            ArbiterConfig::default(),
            Arc::new(NoopSpeechOutput::new()),
            Arc::new(dialogue),
        );
        (arbiter, rx)
    }

    #[test]
    fn context_records_spacing_between_utterances() {
        let mut context = TurnContext::default();
        let t0 = Instant::now();
        assert_eq!(context.observe(t0, Some("alice")), None);
        assert_eq!(
            context.observe(t0 + Duration::from_millis(300), None),
            Some(Duration::from_millis(300))
        );
        assert_eq!(context.active_speaker(), Some("alice"));
        assert_eq!(
            context.last_user_speech_at(),
            Some(t0 + Duration::from_millis(300))
        );
    }

    #[test]
    fn blank_utterance_does_not_touch_context() {
        let (mut arbiter, _rx) = arbiter();
        arbiter.on_utterance(&Utterance::new("   "));
        assert!(arbiter.context().last_user_speech_at().is_none());
    }

    #[test]
    fn idle_dispatch_does_not_mark_interrupted() {
        let (mut arbiter, mut rx) = arbiter();
        let decision = arbiter.on_utterance(&Utterance::new("what's the weather"));
        assert_eq!(decision.label(), "dispatch");
        assert_eq!(arbiter.tracker().state(), OutputState::Idle);
        assert_eq!(rx.try_recv().unwrap().text, "what's the weather");
    }

    #[test]
    fn interrupted_state_counts_as_not_speaking() {
        let (mut arbiter, _rx) = arbiter();
        arbiter.tracker().notify_interrupted();
        let decision = arbiter.on_utterance(&Utterance::new("umm"));
        assert_eq!(decision.label(), "dispatch");
    }

    #[test]
    fn dispatch_survives_closed_consumer() {
        let (mut arbiter, rx) = arbiter();
        drop(rx);
        arbiter.tracker().notify_started();
        let decision = arbiter.on_utterance(&Utterance::new("hey agent wait"));
        assert_eq!(decision.label(), "interrupt");
        assert_eq!(arbiter.tracker().state(), OutputState::Interrupted);
    }
}
