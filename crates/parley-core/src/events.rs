//! Events published by an arbiter session for observers (logs, UI, tests).
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "output_state_changed", "state": "speaking" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{Decision, OutputState, Verdict};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArbiterEvent {
    /// The arbiter reached a decision for one utterance.
    Decided {
        speaker: Option<String>,
        verdict: Verdict,
        decision: Decision,
    },

    /// An audio source was attributed to a participant.
    TrackRegistered { source_id: String, identity: String },

    /// The speech output tracker changed state.
    OutputStateChanged { state: OutputState },

    /// Stopping speech output failed; the turn was dispatched regardless.
    StopFailed { error: String },

    /// The dialogue consumer did not accept a turn.
    DispatchFailed { error: String },
}

impl ArbiterEvent {
    /// The decision carried by a `Decided` event.
    pub const fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Decided { decision, .. } => Some(decision),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscardReason, EmptyReason};

    #[test]
    fn event_serializes_with_type_tag() {
        let event = ArbiterEvent::OutputStateChanged {
            state: OutputState::Speaking,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "output_state_changed");
        assert_eq!(json["state"], "speaking");
    }

    #[test]
    fn decided_event_exposes_decision() {
        let event = ArbiterEvent::Decided {
            speaker: None,
            verdict: Verdict::Empty {
                reason: EmptyReason::Blank,
            },
            decision: Decision::Discard {
                reason: DiscardReason::Blank,
            },
        };
        assert!(event.decision().is_some_and(Decision::is_discard));
        assert!(
            ArbiterEvent::StopFailed {
                error: "x".to_string()
            }
            .decision()
            .is_none()
        );
    }
}
