//! Synthesized-speech output state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-wide state of the agent's speech output.
///
/// `Interrupted` is distinct from `Idle` only for observability; neither
/// counts as speaking when the arbiter consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputState {
    #[default]
    Idle,
    Speaking,
    Interrupted,
}

impl OutputState {
    pub const fn is_speaking(self) -> bool {
        matches!(self, Self::Speaking)
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Speaking => "speaking",
            Self::Interrupted => "interrupted",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_speaking_counts_as_speaking() {
        assert!(OutputState::Speaking.is_speaking());
        assert!(!OutputState::Idle.is_speaking());
        assert!(!OutputState::Interrupted.is_speaking());
    }
}
