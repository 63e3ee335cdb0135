//! Domain types shared by every parley crate.

mod output;
mod turn;
mod utterance;
mod verdict;

pub use output::OutputState;
pub use turn::{Decision, DiscardReason, UserTurn};
pub use utterance::{DEFAULT_CONFIDENCE, Token, TokenClass, Utterance};
pub use verdict::{EmptyReason, Verdict};
