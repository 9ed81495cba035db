use std::time::Duration;

use radio_anchor::config::VoiceConfig;
use radio_anchor::kernel::event::{Utterance, UtteranceId, VoiceEvent};
use radio_anchor::voice::{
    AudioArbiter, CommandArbiter, CommandBackend, FocusHandle, FocusOutcome, SynthesisBackend,
    VoiceEventSink,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

fn backend(program: &str) -> (CommandBackend, mpsc::UnboundedReceiver<VoiceEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut backend = CommandBackend::new(&VoiceConfig {
        program: program.to_string(),
        args: Vec::new(),
    });
    backend.init(VoiceEventSink::new(tx)).unwrap();
    (backend, rx)
}

fn utterance(session: Uuid, sequence: u64) -> Utterance {
    Utterance {
        id: UtteranceId { session, sequence },
        text: format!("message {}", sequence),
        enqueued_at: Instant::now(),
    }
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<VoiceEvent>) -> VoiceEvent {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("backend never reported")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_successful_program_reports_started_then_done() {
    let (mut backend, mut rx) = backend("true");
    let session = Uuid::new_v4();
    let u1 = utterance(session, 1);
    let u2 = utterance(session, 2);

    backend.speak(&u1).unwrap();
    backend.speak(&u2).unwrap();

    // Strictly one after the other
    assert_eq!(next_event(&mut rx).await, VoiceEvent::Started(u1.id));
    assert_eq!(next_event(&mut rx).await, VoiceEvent::Done(u1.id));
    assert_eq!(next_event(&mut rx).await, VoiceEvent::Started(u2.id));
    assert_eq!(next_event(&mut rx).await, VoiceEvent::Done(u2.id));
}

#[tokio::test]
async fn test_failing_program_reports_exit_code() {
    let (mut backend, mut rx) = backend("false");
    let u1 = utterance(Uuid::new_v4(), 1);

    backend.speak(&u1).unwrap();

    assert_eq!(next_event(&mut rx).await, VoiceEvent::Started(u1.id));
    assert_eq!(
        next_event(&mut rx).await,
        VoiceEvent::Error { id: u1.id, code: Some(1) }
    );
}

#[tokio::test]
async fn test_missing_program_reports_error_without_code() {
    let (mut backend, mut rx) = backend("radio-anchor-no-such-voice");
    let u1 = utterance(Uuid::new_v4(), 1);

    backend.speak(&u1).unwrap();

    assert_eq!(next_event(&mut rx).await, VoiceEvent::Started(u1.id));
    assert_eq!(
        next_event(&mut rx).await,
        VoiceEvent::Error { id: u1.id, code: None }
    );
}

#[test]
fn test_speak_before_init_is_refused() {
    let mut backend = CommandBackend::new(&VoiceConfig::default());
    assert!(backend.speak(&utterance(Uuid::new_v4(), 1)).is_err());
}

#[tokio::test]
async fn test_empty_duck_command_fails_request() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let sink = VoiceEventSink::new(tx);
    let mut arbiter = CommandArbiter::new(Some(Vec::new()), None);

    assert_eq!(arbiter.request(&sink), FocusOutcome::Failed);
}

#[tokio::test]
async fn test_duck_command_grants_fresh_handles() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let sink = VoiceEventSink::new(tx);
    let mut arbiter = CommandArbiter::new(
        Some(vec!["true".to_string()]),
        Some(vec!["true".to_string()]),
    );

    assert_eq!(arbiter.request(&sink), FocusOutcome::Granted(FocusHandle(1)));
    arbiter.release(FocusHandle(1));
    assert_eq!(arbiter.request(&sink), FocusOutcome::Granted(FocusHandle(2)));
}
