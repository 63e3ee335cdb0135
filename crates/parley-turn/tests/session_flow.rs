//! End-to-end tests for `ArbiterSession`: queueing, ordering, and the
//! events a running session publishes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mockall::mock;
use parley_core::{
    ArbiterConfig, ArbiterEvent, ArbiterSettings, ChannelDialogue, NoopSpeechOutput, OutputError,
    OutputState, SpeechOutput, UserTurn, Utterance,
};
use parley_turn::{ArbiterSession, SessionError, SessionHandle};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

mock! {
    pub Output {}

    impl SpeechOutput for Output {
        fn stop_output(&self) -> Result<(), OutputError>;
    }
}

fn spawn_default() -> (
    SessionHandle,
    mpsc::UnboundedReceiver<ArbiterEvent>,
    mpsc::UnboundedReceiver<UserTurn>,
) {
    let (dialogue, turns) = ChannelDialogue::new();
    let (handle, events) = ArbiterSession::spawn(
        ArbiterConfig::default(),
        Arc::new(NoopSpeechOutput::new()),
        Arc::new(dialogue),
    );
    (handle, events, turns)
}

fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<ArbiterEvent>) -> ArbiterEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("session event channel closed")
}

#[tokio::test]
async fn utterances_are_arbitrated_in_arrival_order() {
    let (handle, _events, mut turns) = spawn_default();

    let texts = ["first thing", "second thing", "third thing", "fourth thing"];
    for text in texts {
        assert_ok!(handle.submit(Utterance::new(text)).await);
    }
    let stats = handle.shutdown().await.unwrap();

    let received: Vec<String> = drain(&mut turns).into_iter().map(|t| t.text).collect();
    assert_eq!(received, texts);
    assert_eq!(stats.utterances, 4);
    assert_eq!(stats.dispatched, 4);
}

#[tokio::test]
async fn synthesis_signals_drive_interruption() {
    let mut output = MockOutput::new();
    output.expect_stop_output().times(1).returning(|| Ok(()));
    let (dialogue, mut turns) = ChannelDialogue::new();
    let (handle, _events) =
        ArbiterSession::spawn(ArbiterConfig::default(), Arc::new(output), Arc::new(dialogue));

    let tracker = handle.tracker();
    tracker.notify_started();
    let t0 = Instant::now();
    assert_ok!(handle.submit(Utterance::new("uh").received_at(t0)).await);
    assert_ok!(
        handle
            .submit(Utterance::new("and another thing").received_at(t0 + Duration::from_millis(200)))
            .await
    );
    assert_ok!(
        handle
            .submit(Utterance::new("wait hey agent").received_at(t0 + Duration::from_millis(300)))
            .await
    );
    let stats = handle.shutdown().await.unwrap();

    assert_eq!(stats.discarded, 1);
    assert_eq!(stats.deferred, 1);
    assert_eq!(stats.interrupted, 1);
    assert_eq!(tracker.state(), OutputState::Interrupted);
    assert_eq!(tracker.counters().interrupted, 1);

    let turns = drain(&mut turns);
    assert_eq!(turns.len(), 1);
    assert!(turns[0].interrupted_output);
    assert!(turns[0].via_wake_phrase);
}

#[tokio::test]
async fn output_state_changes_are_published() {
    let (handle, mut events, _turns) = spawn_default();
    let tracker = handle.tracker();

    tracker.notify_started();
    assert_eq!(
        next_event(&mut events).await,
        ArbiterEvent::OutputStateChanged {
            state: OutputState::Speaking
        }
    );

    tracker.notify_completed();
    assert_eq!(
        next_event(&mut events).await,
        ArbiterEvent::OutputStateChanged {
            state: OutputState::Idle
        }
    );

    assert_ok!(handle.shutdown().await);
}

#[tokio::test]
async fn try_submit_reports_busy_when_queue_is_full() {
    let settings = ArbiterSettings {
        session_queue_capacity: Some(1),
        ..ArbiterSettings::with_defaults()
    };
    let config = ArbiterConfig::from_settings(&settings).unwrap();
    let (dialogue, _turns) = ChannelDialogue::new();
    let (handle, _events) =
        ArbiterSession::spawn(config, Arc::new(NoopSpeechOutput::new()), Arc::new(dialogue));

    // Nothing yields between the two calls, so the task cannot drain the queue.
    assert_ok!(handle.try_submit(Utterance::new("one")));
    let err = assert_err!(handle.try_submit(Utterance::new("two")));
    assert!(matches!(err, SessionError::Busy));

    let stats = handle.shutdown().await.unwrap();
    assert_eq!(stats.utterances, 1);
}

#[tokio::test]
async fn registered_tracks_attribute_turns() {
    let (handle, mut events, mut turns) = spawn_default();

    handle.register_track("TR_1", "bob");
    handle.register_track("TR_1", "bob");
    assert_ok!(
        handle
            .submit(Utterance::new("set a timer").with_source("TR_1"))
            .await
    );
    assert_ok!(
        handle
            .submit(Utterance::new("for ten minutes").with_source("TR_2"))
            .await
    );
    assert_eq!(handle.registry().len(), 1);
    handle.shutdown().await.unwrap();

    let registered = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, ArbiterEvent::TrackRegistered { .. }))
        .count();
    assert_eq!(registered, 1);

    let turns = drain(&mut turns);
    assert_eq!(turns[0].speaker.as_deref(), Some("bob"));
    assert_eq!(turns[1].speaker, None);
}

#[tokio::test]
async fn submitters_share_the_session_queue() {
    let (handle, _events, mut turns) = spawn_default();
    let submitter = handle.submitter();

    assert_ok!(submitter.submit(Utterance::new("from the recogniser")).await);
    assert_ok!(handle.submit(Utterance::new("from the handle")).await);
    drop(submitter);

    let stats = handle.shutdown().await.unwrap();
    assert_eq!(stats.dispatched, 2);
    assert_eq!(drain(&mut turns)[0].text, "from the recogniser");
}

#[tokio::test]
async fn sessions_do_not_share_state() {
    let (speaking, _events_a, mut turns_a) = spawn_default();
    let (idle, _events_b, mut turns_b) = spawn_default();

    speaking.tracker().notify_started();
    speaking.register_track("TR_x", "carol");

    for handle in [&speaking, &idle] {
        assert_ok!(
            handle
                .submit(Utterance::new("what's on my calendar").with_source("TR_x"))
                .await
        );
    }

    let stats_a = speaking.shutdown().await.unwrap();
    let stats_b = idle.shutdown().await.unwrap();

    assert_eq!(stats_a.interrupted, 1);
    assert_eq!(stats_b.dispatched, 1);

    let a = drain(&mut turns_a);
    let b = drain(&mut turns_b);
    assert_eq!(a[0].speaker.as_deref(), Some("carol"));
    assert!(a[0].interrupted_output);
    assert_eq!(b[0].speaker, None);
    assert!(!b[0].interrupted_output);
}

#[tokio::test]
async fn session_runs_without_an_event_listener() {
    let (handle, events, mut turns) = spawn_default();
    drop(events);

    handle.register_track("TR_1", "dana");
    handle.tracker().notify_started();
    handle.tracker().notify_completed();
    assert_ok!(
        handle
            .submit(Utterance::new("read my messages").with_source("TR_1"))
            .await
    );

    let stats = handle.shutdown().await.unwrap();
    assert_eq!(stats.dispatched, 1);
    assert_eq!(drain(&mut turns)[0].speaker.as_deref(), Some("dana"));
}
