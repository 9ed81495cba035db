mod common;

use std::time::Duration;

use common::{RecordingBackend, ScriptedArbiter};
use radio_anchor::ingress::read_broadcasts;
use radio_anchor::{AnchorConfig, AnchorError, RadioService, Track, TrackState, TrackUpdate};
use tokio_util::sync::CancellationToken;

fn config() -> AnchorConfig {
    AnchorConfig {
        seed: Some(1),
        ..AnchorConfig::default()
    }
}

/// Polls until the backend has been asked to speak `count` messages.
async fn wait_for_spoken(backend: &RecordingBackend, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while backend.texts().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("backend never received the expected utterances");
}

#[tokio::test]
async fn test_ingress_to_voice_end_to_end() {
    let backend = RecordingBackend::new();
    let arbiter = ScriptedArbiter::granting();
    let mut service = RadioService::new(config());
    let ingress = service.start(Box::new(backend.clone()), Box::new(arbiter.clone()));

    let song = TrackUpdate::new(Track::new(Some("B"), Some("X"), Some("M")), TrackState::Playing);
    ingress.submit(song.clone()).unwrap();
    ingress.submit(song).unwrap();
    ingress
        .submit(TrackUpdate::new(Track::new(Some("C"), Some("X"), Some("M")), TrackState::Playing))
        .unwrap();

    wait_for_spoken(&backend, 2).await;

    // Drive the lifecycle like a real backend would
    let voice = service.voice().expect("service running");
    let spoken = backend.utterances();
    let events = voice.events();
    for u in &spoken {
        events.started(u.id);
        events.done(u.id);
    }
    let status = voice.status().await.unwrap();
    assert!(!status.lease_held);

    service.stop().await.unwrap();

    let snap = service.telemetry().snapshot();
    assert_eq!(snap.decision_stats.updates, 3);
    assert_eq!(snap.decision_stats.duplicates, 1);
    assert_eq!(snap.decision_stats.announcements, 2);
    // Both were queued before playback: one lease covers the burst
    assert_eq!(arbiter.requests(), 1);
    assert_eq!(arbiter.releases(), 1);
}

#[tokio::test]
async fn test_start_is_idempotent() {
    let mut service = RadioService::new(config());
    let first = RecordingBackend::new();
    let second = RecordingBackend::new();

    let ingress = service.start(Box::new(first.clone()), Box::new(ScriptedArbiter::granting()));
    let again = service.start(Box::new(second.clone()), Box::new(ScriptedArbiter::granting()));
    assert!(service.is_running());

    again
        .submit(TrackUpdate::new(Track::new(Some("B"), None, None), TrackState::Playing))
        .unwrap();
    wait_for_spoken(&first, 1).await;
    assert!(second.texts().is_empty(), "Second backend must stay unused");

    drop(ingress);
    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_releases_focus_and_closes_ingress() {
    let backend = RecordingBackend::new();
    let arbiter = ScriptedArbiter::granting();
    let mut service = RadioService::new(config());
    let ingress = service.start(Box::new(backend.clone()), Box::new(arbiter.clone()));

    ingress
        .submit(TrackUpdate::new(Track::new(Some("B"), Some("X"), None), TrackState::Playing))
        .unwrap();
    wait_for_spoken(&backend, 1).await;

    // Utterance starts but never finishes before shutdown
    let voice = service.voice().unwrap();
    voice.events().started(backend.utterances()[0].id);
    assert!(voice.status().await.unwrap().lease_held);

    service.stop().await.unwrap();
    assert!(!service.is_running());
    assert_eq!(arbiter.releases(), 1, "Best-effort release on stop");

    let res = ingress.submit(TrackUpdate::new(Track::default(), TrackState::Playing));
    assert!(matches!(res, Err(AnchorError::AnchorUnavailable)));
    assert!(matches!(service.stop().await, Err(AnchorError::NotRunning)));
}

#[tokio::test]
async fn test_stdin_style_broadcast_stream() {
    let backend = RecordingBackend::new();
    let mut service = RadioService::new(config());
    let ingress = service.start(Box::new(backend.clone()), Box::new(ScriptedArbiter::granting()));

    let input: &[u8] = b"{\"track\":\"B\",\"artist\":\"X\",\"playing\":true}\n\
        not json\n\
        null\n\
        \n\
        {\"track\":\"B\",\"artist\":\"X\",\"preparing\":true}\n\
        {\"track\":\"C\",\"artist\":\"X\",\"playing\":true}\n";

    read_broadcasts(input, ingress, CancellationToken::new()).await.unwrap();
    wait_for_spoken(&backend, 2).await;

    let texts = backend.texts();
    assert!(texts[1].contains('C') && texts[1].contains('X'), "Unexpected: {}", texts[1]);

    service.stop().await.unwrap();
    assert_eq!(service.telemetry().snapshot().decision_stats.updates, 3);
}
