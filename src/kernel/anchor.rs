use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::event::{TrackUpdate, UtteranceId};
use super::telemetry::event::TelemetryEvent;
use super::telemetry::Telemetry;
use super::templates::{compose, Scenario, TemplateFamily};
use super::track::{Track, TrackState};
use crate::config::AnchorConfig;
use crate::error::Result;
use crate::voice::VoiceHandle;

/// What the anchor remembers between updates. Process lifetime only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementSession {
    pub last_announced: Option<Track>,
    /// None means "never".
    pub last_announcement: Option<Instant>,
}

impl AnnouncementSession {
    pub fn greeting_due(&self, now: Instant, cooldown: Duration) -> bool {
        match self.last_announcement {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= cooldown,
        }
    }
}

/// A message the anchor decided on and handed to the voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub family: TemplateFamily,
    pub greeting_due: bool,
    pub utterance: UtteranceId,
}

/// Announcement decision engine.
///
/// Constructed once per process. Feeds on `TrackUpdate`s in arrival order and
/// hands any message to the voice without waiting for it to be spoken.
pub struct RadioAnchor {
    voice: VoiceHandle,
    session: AnnouncementSession,
    cooldown: Duration,
    rng: Box<dyn RngCore + Send>,
    telemetry: Telemetry,
}

impl RadioAnchor {
    pub fn new(voice: VoiceHandle, config: &AnchorConfig, telemetry: Telemetry) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(voice, config.cooldown(), Box::new(rng), telemetry)
    }

    pub fn with_rng(
        voice: VoiceHandle,
        cooldown: Duration,
        rng: Box<dyn RngCore + Send>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            voice,
            session: AnnouncementSession::default(),
            cooldown,
            rng,
            telemetry,
        }
    }

    pub fn session(&self) -> &AnnouncementSession {
        &self.session
    }

    /// Decide whether `update` deserves a message, and if so queue it.
    ///
    /// The session only moves forward once the voice accepted the message:
    /// a `Preparing` / `Stopped` update or a failed hand-off leaves it untouched.
    pub async fn handle_update(&mut self, update: TrackUpdate) -> Result<Option<Announcement>> {
        let TrackUpdate { track, state } = update;
        info!("Received update {} changed to {:?}", track, state);
        self.telemetry.record(TelemetryEvent::UpdateReceived { state });

        if self.session.last_announced.as_ref() == Some(&track) {
            debug!("{} already announced", track);
            self.telemetry.record(TelemetryEvent::DuplicateSuppressed);
            return Ok(None);
        }
        debug!("{} ≠ {:?}", track, self.session.last_announced);

        let now = Instant::now();
        let greeting_due = self.session.greeting_due(now, self.cooldown);
        if greeting_due {
            self.send_greetings();
        }

        if state != TrackState::Playing {
            return Ok(None);
        }

        let title = track.clean_title();
        let scenario = classify(
            &track,
            title.as_deref(),
            self.session.last_announced.as_ref(),
        );
        let family = scenario.family();
        let text = compose(&scenario, &mut *self.rng);

        let utterance = self.voice.enqueue(text.clone()).await?;

        self.session.last_announced = Some(track);
        if greeting_due {
            self.session.last_announcement = Some(now);
        }
        self.telemetry
            .record(TelemetryEvent::Announced { family, greeting_due });

        Ok(Some(Announcement {
            text,
            family,
            greeting_due,
            utterance: utterance.id,
        }))
    }

    /// Hook for station greetings. Says nothing yet.
    fn send_greetings(&self) {}

    /// Drains `updates` until the channel closes or `cancel` fires.
    pub async fn run(
        mut self,
        mut updates: mpsc::UnboundedReceiver<TrackUpdate>,
        cancel: CancellationToken,
    ) {
        info!("Radio anchor on air. Cooldown: {:?}", self.cooldown);

        loop {
            let update = tokio::select! {
                _ = cancel.cancelled() => break,
                update = updates.recv() => match update {
                    Some(update) => update,
                    None => break,
                },
            };

            if let Err(e) = self.handle_update(update).await {
                error!("Failed to hand off announcement: {}", e);
                break;
            }
        }

        info!("Radio anchor off air");
    }
}

/// PURE FUNCTION: picks the template scenario for `track`, given the last announced one.
///
/// `title` is the cleaned title of `track` (see `Track::clean_title`).
/// Branch order matters, first match wins.
pub fn classify<'a>(
    track: &'a Track,
    title: Option<&'a str>,
    previous: Option<&Track>,
) -> Scenario<'a> {
    let artist = track.artist();
    let album = track.album();

    let Some(title) = title else {
        return Scenario::NoTitle { artist, album };
    };

    let previous_artist = previous.and_then(Track::artist);
    let previous_album = previous.and_then(Track::album);

    match (artist, album) {
        (None, None) => Scenario::NoSource { title },
        (Some(artist), _) if Some(artist) == previous_artist => Scenario::SameArtist { artist, title },
        (_, Some(album)) if Some(album) == previous_album => Scenario::SameAlbum { album, title },
        (None, Some(album)) => Scenario::NewAlbum { album, title },
        (Some(artist), _) => Scenario::NewArtist { artist, title },
    }
}
