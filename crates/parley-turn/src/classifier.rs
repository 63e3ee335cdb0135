//! Token classifier - decides whether an utterance carries real content.
//!
//! Rules are applied in order and the first match wins:
//!
//! 1. Blank transcript → `Empty`.
//! 2. Any wake phrase inside the case-folded transcript → `Meaningful`.
//!    This is the only rule that beats low confidence: stop commands are
//!    often clipped and poorly recognised.
//! 3. Confidence under the floor → `Empty`.
//! 4. With token annotations: drop noise-class tokens; too few left →
//!    `Empty`, otherwise the non-blank survivors become the working text
//!    (the transcript when every survivor is blank).
//! 5. Every word of the working text is a filler → `FillerOnly`.
//! 6. Otherwise → `Meaningful`.
//!
//! Token-level filtering (rule 4) survives fillers embedded in real
//! sentences. The whole-string filler check (rule 5) covers backends that
//! report no tokens.

use std::collections::HashSet;

use parley_core::{ArbiterConfig, EmptyReason, Utterance, Verdict};

/// Stateless classifier over a resolved [`ArbiterConfig`].
#[derive(Debug, Clone, Default)]
pub struct TokenClassifier {
    config: ArbiterConfig,
}

impl TokenClassifier {
    #[must_use]
    pub const fn new(config: ArbiterConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Classify one utterance.
    pub fn classify(&self, utterance: &Utterance) -> Verdict {
        let trimmed = utterance.text().trim();
        if trimmed.is_empty() {
            return Verdict::Empty {
                reason: EmptyReason::Blank,
            };
        }

        let folded = trimmed.to_lowercase();

        if let Some(phrase) = self.wake_phrase_in(&folded) {
            tracing::debug!(phrase, "Wake phrase matched");
            return Verdict::Meaningful {
                text: folded,
                via_wake_phrase: true,
            };
        }

        let confidence = utterance.confidence();
        if confidence < self.config.min_confidence() {
            tracing::trace!(
                confidence,
                floor = self.config.min_confidence(),
                "Confidence below floor"
            );
            return Verdict::Empty {
                reason: EmptyReason::LowConfidence,
            };
        }

        let working = if utterance.tokens().is_empty() {
            folded
        } else {
            let kept: Vec<&str> = utterance
                .tokens()
                .iter()
                .filter(|token| !self.config.is_noise_class(token.class))
                .map(|token| token.text.trim())
                .collect();

            if kept.len() < self.config.min_meaningful_tokens() {
                tracing::trace!(
                    kept = kept.len(),
                    total = utterance.tokens().len(),
                    "Too few meaningful tokens"
                );
                return Verdict::Empty {
                    reason: EmptyReason::NoMeaningfulTokens,
                };
            }

            let rebuilt = kept
                .iter()
                .filter(|text| !text.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ");

            // Nothing to rebuild from, so keep the transcript.
            if rebuilt.is_empty() {
                folded
            } else {
                rebuilt.to_lowercase()
            }
        };

        if self.is_filler_only(&working) {
            return Verdict::FillerOnly { text: working };
        }

        Verdict::Meaningful {
            text: working,
            via_wake_phrase: false,
        }
    }

    /// First configured wake phrase contained in `folded`.
    fn wake_phrase_in(&self, folded: &str) -> Option<&str> {
        self.config
            .wake_phrases()
            .iter()
            .map(String::as_str)
            .find(|phrase| folded.contains(phrase))
    }

    fn is_filler_only(&self, working: &str) -> bool {
        let words: HashSet<&str> = working.split_whitespace().collect();
        !words.is_empty()
            && words
                .iter()
                .all(|word| self.config.filler_words().contains(*word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Token, TokenClass};

    fn classifier() -> TokenClassifier {
        TokenClassifier::new(ArbiterConfig::default())
    }

    fn meaningful(text: &str) -> Verdict {
        Verdict::Meaningful {
            text: text.to_string(),
            via_wake_phrase: false,
        }
    }

    #[test]
    fn blank_text_is_empty() {
        for text in ["", "   ", "\t\n"] {
            assert_eq!(
                classifier().classify(&Utterance::new(text)),
                Verdict::Empty {
                    reason: EmptyReason::Blank
                }
            );
        }
    }

    #[test]
    fn blank_text_is_empty_even_with_wake_tokens() {
        let u = Utterance::new("  ").with_tokens([Token::word("stop")]);
        assert!(classifier().classify(&u).is_empty());
    }

    #[test]
    fn wake_phrase_overrides_low_confidence() {
        let u = Utterance::new("Hey Agent stop").with_confidence(0.1);
        assert_eq!(
            classifier().classify(&u),
            Verdict::Meaningful {
                text: "hey agent stop".to_string(),
                via_wake_phrase: true,
            }
        );
    }

    #[test]
    fn wake_phrase_bypasses_token_filtering() {
        let u = Utterance::new("umm cancel")
            .with_confidence(0.2)
            .with_tokens([Token::filler("umm"), Token::new("cancel", TokenClass::Noise)]);
        assert!(classifier().classify(&u).is_wake());
    }

    #[test]
    fn wake_phrase_matches_as_substring() {
        let u = Utterance::new("could you please STOP talking").with_confidence(0.3);
        assert!(classifier().classify(&u).is_wake());
    }

    #[test]
    fn low_confidence_is_empty() {
        let u = Utterance::new("turn on the lights").with_confidence(0.4);
        assert_eq!(
            classifier().classify(&u),
            Verdict::Empty {
                reason: EmptyReason::LowConfidence
            }
        );
    }

    #[test]
    fn confidence_at_floor_passes() {
        let u = Utterance::new("turn on the lights").with_confidence(0.55);
        assert_eq!(classifier().classify(&u), meaningful("turn on the lights"));
    }

    #[test]
    fn all_filler_tokens_are_empty() {
        let u = Utterance::new("umm uh")
            .with_confidence(0.98)
            .with_tokens([Token::filler("umm"), Token::filler("uh")]);
        assert_eq!(
            classifier().classify(&u),
            Verdict::Empty {
                reason: EmptyReason::NoMeaningfulTokens
            }
        );
    }

    #[test]
    fn unknown_tokens_count_as_noise() {
        let u = Utterance::new("mmhmm")
            .with_tokens([Token::new("mmhmm", TokenClass::from_label("backchannel"))]);
        assert!(classifier().classify(&u).is_empty());
    }

    #[test]
    fn working_text_is_rebuilt_from_surviving_tokens() {
        let u = Utterance::new("please play the next song")
            .with_confidence(0.95)
            .with_tokens([Token::word("Please"), Token::word("play"), Token::word("the")]);
        assert_eq!(classifier().classify(&u), meaningful("please play the"));
    }

    #[test]
    fn embedded_fillers_are_stripped_by_tokens() {
        let u = Utterance::new("uh what time is it").with_tokens([
            Token::filler("uh"),
            Token::word("what"),
            Token::word("time"),
            Token::word("is"),
            Token::word("it"),
        ]);
        assert_eq!(classifier().classify(&u), meaningful("what time is it"));
    }

    #[test]
    fn token_minimum_is_configurable() {
        let config = ArbiterConfig::default().with_min_meaningful_tokens(2);
        let u = Utterance::new("yes umm").with_tokens([Token::word("yes"), Token::filler("umm")]);
        assert!(TokenClassifier::new(config).classify(&u).is_empty());
    }

    #[test]
    fn zero_token_minimum_falls_back_to_transcript() {
        let config = ArbiterConfig::default().with_min_meaningful_tokens(0);
        let u = Utterance::new("Umm Hmm").with_tokens([Token::filler("umm"), Token::filler("hmm")]);
        assert_eq!(
            TokenClassifier::new(config).classify(&u),
            Verdict::FillerOnly {
                text: "umm hmm".to_string()
            }
        );
    }

    #[test]
    fn blank_word_tokens_still_count() {
        let u = Utterance::new("Hello there").with_tokens([Token::word("")]);
        assert_eq!(classifier().classify(&u), meaningful("hello there"));

        let u = Utterance::new("turn it up").with_tokens([
            Token::word(" "),
            Token::word("Turn"),
            Token::word("up"),
        ]);
        assert_eq!(classifier().classify(&u), meaningful("turn up"));
    }

    #[test]
    fn filler_only_without_tokens() {
        let u = Utterance::new("Umm  hmm uh");
        assert_eq!(
            classifier().classify(&u),
            Verdict::FillerOnly {
                text: "umm  hmm uh".to_string()
            }
        );
    }

    #[test]
    fn filler_mixed_with_words_is_meaningful() {
        let u = Utterance::new("umm yes");
        assert_eq!(classifier().classify(&u), meaningful("umm yes"));
    }

    #[test]
    fn word_tokens_that_are_fillers_are_filler_only() {
        let u = Utterance::new("like like").with_tokens([Token::word("like"), Token::word("like")]);
        assert_eq!(
            classifier().classify(&u),
            Verdict::FillerOnly {
                text: "like like".to_string()
            }
        );
    }

    #[test]
    fn custom_wake_phrases_replace_defaults() {
        let config = ArbiterConfig::default().with_wake_phrases(["Computer"]);
        let classifier = TokenClassifier::new(config);

        assert!(
            classifier
                .classify(&Utterance::new("computer, pause").with_confidence(0.1))
                .is_wake()
        );
        assert!(
            classifier
                .classify(&Utterance::new("stop").with_confidence(0.1))
                .is_empty()
        );
    }
}
