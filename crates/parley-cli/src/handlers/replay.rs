//! Replay command handler.
//!
//! Feeds a script through a live session, paced by the script's `atMs`
//! offsets, with the echo agent answering dispatched turns.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parley_core::{ArbiterConfig, ArbiterEvent, ChannelDialogue, Decision, Verdict};
use parley_turn::{ArbiterSession, OutputTracker, SessionStats};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::echo::{SimulatedSpeech, run_echo_agent};
use crate::error::CliError;
use crate::script::{OutputSignal, ScriptEvent, parse_script, to_utterance};

/// Arguments for the replay command.
pub struct ReplayArgs {
    pub script: PathBuf,
    pub reply_duration: Duration,
    pub json: bool,
}

/// What a finished replay produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub stats: SessionStats,
    /// Echo replies in the order they were spoken.
    pub replies: Vec<String>,
}

/// Execute the replay command.
pub async fn execute(config: ArbiterConfig, args: ReplayArgs) -> Result<ReplayReport> {
    let file = File::open(&args.script).map_err(|source| CliError::Io {
        path: args.script.clone(),
        source,
    })?;
    let events = parse_script(BufReader::new(file))?;
    tracing::info!(
        script = %args.script.display(),
        events = events.len(),
        "Replaying script"
    );

    let speech = SimulatedSpeech::new();
    let (dialogue, turns) = ChannelDialogue::new();
    let (handle, session_events) =
        ArbiterSession::spawn(config, Arc::new(speech.clone()), Arc::new(dialogue));
    let tracker = handle.tracker();

    let start = Instant::now();
    let agent = tokio::spawn(run_echo_agent(
        turns,
        speech.clone(),
        tracker.clone(),
        args.reply_duration,
    ));
    let printer = tokio::spawn(print_events(session_events, start, args.json));

    let base = start.into_std();
    for event in &events {
        tokio::time::sleep_until(start + event.offset()).await;
        match event {
            ScriptEvent::Track {
                source_id,
                identity,
                ..
            } => handle.register_track(source_id.clone(), identity.clone()),
            ScriptEvent::Output { signal, .. } => apply_signal(&tracker, *signal),
            ScriptEvent::Utterance {
                at_ms,
                text,
                confidence,
                tokens,
                source_id,
            } => {
                let utterance =
                    to_utterance(base, *at_ms, text, *confidence, tokens, source_id.as_deref());
                handle.submit(utterance).await.map_err(CliError::from)?;
            }
        }
    }

    // Let the last reply finish before closing the session.
    if speech.is_playing() {
        tokio::time::sleep(args.reply_duration).await;
    }

    let stats = handle.shutdown().await.map_err(CliError::from)?;
    let replies = agent.await?;
    printer.await?;

    if !args.json {
        print_summary(events.len(), &stats, replies.len());
    }
    Ok(ReplayReport { stats, replies })
}

fn apply_signal(tracker: &OutputTracker, signal: OutputSignal) {
    match signal {
        OutputSignal::Started => tracker.notify_started(),
        OutputSignal::Completed => tracker.notify_completed(),
        OutputSignal::Interrupted => tracker.notify_interrupted(),
    }
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<ArbiterEvent>, start: Instant, json: bool) {
    while let Some(event) = rx.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize session event"),
            }
            continue;
        }

        let at = start.elapsed().as_millis();
        match event {
            ArbiterEvent::Decided {
                speaker,
                verdict,
                decision,
            } => println!(
                "[{at:>6}ms] {:<10} {:<8} {}",
                decision.label(),
                speaker.as_deref().unwrap_or("-"),
                describe(&decision, &verdict)
            ),
            ArbiterEvent::TrackRegistered {
                source_id,
                identity,
            } => println!("[{at:>6}ms] track      {source_id} -> {identity}"),
            ArbiterEvent::OutputStateChanged { state } => {
                println!("[{at:>6}ms] output     {state}");
            }
            ArbiterEvent::StopFailed { error } | ArbiterEvent::DispatchFailed { error } => {
                println!("[{at:>6}ms] warning    {error}");
            }
        }
    }
}

/// One-line description of a decision for the transcript view.
pub fn describe(decision: &Decision, verdict: &Verdict) -> String {
    match decision {
        Decision::Dispatch { turn } | Decision::Interrupt { turn } => format!("\"{}\"", turn.text),
        Decision::Defer { elapsed } => format!(
            "{} \"{}\" ({}ms since last speech)",
            verdict.label(),
            verdict.text().unwrap_or_default(),
            elapsed.as_millis()
        ),
        Decision::Discard { reason } => format!("{} ({reason:?})", verdict.label()),
    }
}

fn print_summary(events: usize, stats: &SessionStats, replies: usize) {
    println!();
    println!("✓ Replayed {events} script events ({} utterances)", stats.utterances);
    println!("  dispatched:  {}", stats.dispatched);
    println!("  interrupted: {}", stats.interrupted);
    println!("  deferred:    {}", stats.deferred);
    println!("  discarded:   {}", stats.discarded);
    println!("  replies:     {replies}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{DiscardReason, EmptyReason, UserTurn};

    #[test]
    fn describe_names_turn_text() {
        let turn = UserTurn {
            speaker: Some("alice".to_string()),
            text: "please play the".to_string(),
            original_text: "please play the next song".to_string(),
            confidence: 0.95,
            source_id: None,
            tokens: Vec::new(),
            received_at: chrono::Utc::now(),
            via_wake_phrase: false,
            interrupted_output: true,
            dispatched_at: chrono::Utc::now(),
        };
        let verdict = Verdict::Meaningful {
            text: "please play the".to_string(),
            via_wake_phrase: false,
        };
        assert_eq!(
            describe(&Decision::Interrupt { turn }, &verdict),
            "\"please play the\""
        );
    }

    #[test]
    fn describe_discard_shows_reason() {
        let verdict = Verdict::Empty {
            reason: EmptyReason::LowConfidence,
        };
        let decision = Decision::Discard {
            reason: DiscardReason::LowConfidence,
        };
        assert_eq!(describe(&decision, &verdict), "empty (LowConfidence)");
    }
}
