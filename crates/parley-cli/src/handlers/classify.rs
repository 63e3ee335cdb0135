//! Classify command handler.

use anyhow::Result;
use parley_core::{ArbiterConfig, Token, TokenClass, Utterance};
use parley_turn::TokenClassifier;

use crate::error::CliError;

/// Parse a `text[:class]` token argument. A missing class means a word.
pub fn parse_token(raw: &str) -> Result<Token, CliError> {
    let (text, class) = match raw.rsplit_once(':') {
        Some((text, label)) => (text.trim(), TokenClass::from_label(label)),
        None => (raw.trim(), TokenClass::Word),
    };
    if text.is_empty() {
        return Err(CliError::Arguments(format!("token '{raw}' has no text")));
    }
    Ok(Token::new(text, class))
}

/// Execute the classify command.
pub fn execute(
    config: ArbiterConfig,
    text: &str,
    confidence: Option<f32>,
    tokens: &[String],
    json: bool,
) -> Result<()> {
    let tokens = tokens
        .iter()
        .map(|raw| parse_token(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut utterance = Utterance::new(text).with_tokens(tokens);
    if let Some(confidence) = confidence {
        utterance = utterance.with_confidence(confidence);
    }

    let verdict = TokenClassifier::new(config).classify(&utterance);

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        match verdict.text() {
            Some(working) => println!("{}: \"{working}\"", verdict.label()),
            None => println!("{}", verdict.label()),
        }
    }
    Ok(())
}
