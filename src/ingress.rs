//! Ingress adapter: raw play-state broadcasts in, `TrackUpdate`s out.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AnchorError, Result};
use crate::kernel::event::TrackUpdate;
use crate::kernel::track::{Track, TrackState};

/// Payload of a `playstatechanged`-style broadcast.
/// Every field may be missing or carry the wrong type; that is still a valid
/// track, with the field read as absent (or `false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaybackBroadcast {
    #[serde(default, deserialize_with = "lenient_string")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub album: Option<String>,
    /// The title. Players call it `track`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub track: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub playing: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub preparing: bool,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

impl PlaybackBroadcast {
    pub fn state(&self) -> TrackState {
        if self.playing {
            TrackState::Playing
        } else if self.preparing {
            TrackState::Preparing
        } else {
            TrackState::Stopped
        }
    }

    pub fn into_update(self) -> TrackUpdate {
        let state = self.state();
        TrackUpdate::new(
            Track {
                title: self.track,
                artist: self.artist,
                album: self.album,
            },
            state,
        )
    }

    /// Decode one JSON broadcast. `null` (no extras at all) yields `None`.
    pub fn parse(payload: &str) -> Result<Option<TrackUpdate>> {
        let broadcast: Option<PlaybackBroadcast> = serde_json::from_str(payload)?;
        Ok(broadcast.map(PlaybackBroadcast::into_update))
    }
}

/// Push side of the decision engine's inbox. Never blocks.
#[derive(Debug, Clone)]
pub struct IngressHandle {
    tx: mpsc::UnboundedSender<TrackUpdate>,
}

impl IngressHandle {
    pub fn new(tx: mpsc::UnboundedSender<TrackUpdate>) -> Self {
        Self { tx }
    }

    pub fn submit(&self, update: TrackUpdate) -> Result<()> {
        self.tx.send(update).map_err(|_| AnchorError::AnchorUnavailable)
    }

    /// Parse and submit one raw broadcast. Returns false when it carried nothing.
    pub fn submit_broadcast(&self, payload: &str) -> Result<bool> {
        match PlaybackBroadcast::parse(payload)? {
            Some(update) => {
                self.submit(update)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Reads one JSON broadcast per line until EOF or cancellation.
/// Malformed lines are logged and skipped.
pub async fn read_broadcasts<R>(reader: R, ingress: IngressHandle, cancel: CancellationToken) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Broadcast stream closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read broadcast: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match ingress.submit_broadcast(&line) {
            Ok(true) => debug!("Broadcast dispatched: '{}'", line),
            Ok(false) => debug!("Broadcast without extras ignored"),
            Err(AnchorError::Ingress(e)) => warn!("Skipping malformed broadcast '{}': {}", line, e),
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
