use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use super::track::{Track, TrackState};

/// Identifies one utterance within a running process.
/// `sequence` is strictly increasing per `session`; ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceId {
    pub session: Uuid,
    pub sequence: u64,
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.sequence)
    }
}

/// One discrete unit of synthesized speech.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub enqueued_at: Instant,
}

/// What the ingress side pushes into the decision engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackUpdate {
    pub track: Track,
    pub state: TrackState,
}

impl TrackUpdate {
    pub fn new(track: Track, state: TrackState) -> Self {
        Self { track, state }
    }
}

/// Focus transitions reported by the audio arbiter after a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gain,
    Loss,
    LossTransient,
    LossTransientCanDuck,
}

/// Callbacks flowing back into the voice actor.
/// Produced by the synthesis backend (and the arbiter for `FocusChanged`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Started(UtteranceId),
    Done(UtteranceId),
    Error { id: UtteranceId, code: Option<i32> },
    FocusChanged(FocusChange),
}
