use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::backend::VoiceEventSink;
use super::focus::{AudioArbiter, FocusHandle, FocusOutcome};
use crate::kernel::event::{FocusChange, Utterance, UtteranceId};
use crate::kernel::telemetry::event::{FocusEventKind, TelemetryEvent, UtteranceStage};
use crate::kernel::telemetry::Telemetry;

/// A live claim on the audio output. At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusLease {
    pub handle: FocusHandle,
    /// False while the arbiter has only delayed the claim.
    pub acquired: bool,
}

/// Sequence numbering and focus lease bookkeeping for the voice.
///
/// Owned by the voice actor, which feeds it one command or callback at a time.
///
/// Lease rule: requested lazily on the first `started` of a burst, released
/// only when the most recently enqueued utterance is `done`.
pub struct FocusController {
    session: Uuid,
    sequence: u64,
    last_enqueued: Option<UtteranceId>,
    lease: Option<FocusLease>,
    arbiter: Box<dyn AudioArbiter>,
    telemetry: Telemetry,
}

impl FocusController {
    pub fn new(arbiter: Box<dyn AudioArbiter>, telemetry: Telemetry) -> Self {
        Self {
            session: Uuid::new_v4(),
            sequence: 0,
            last_enqueued: None,
            lease: None,
            arbiter,
            telemetry,
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.sequence
    }

    pub fn last_enqueued(&self) -> Option<UtteranceId> {
        self.last_enqueued
    }

    pub fn lease(&self) -> Option<FocusLease> {
        self.lease
    }

    /// Allocates the next id. Does not make it the "last enqueued" one yet.
    pub fn next_utterance(&mut self, text: String) -> Utterance {
        self.sequence += 1;
        Utterance {
            id: UtteranceId {
                session: self.session,
                sequence: self.sequence,
            },
            text,
            enqueued_at: Instant::now(),
        }
    }

    /// The backend accepted `id`.
    pub fn mark_enqueued(&mut self, id: UtteranceId) {
        self.last_enqueued = Some(id);
        self.record_stage(id, UtteranceStage::Queued);
    }

    pub fn on_start(&mut self, id: UtteranceId, events: &VoiceEventSink) {
        self.record_stage(id, UtteranceStage::Started);
        if self.lease.is_some() {
            debug!("Utterance:{} started, focus already held", id);
            return;
        }

        info!("Requesting audio focus for utterance:{}", id);
        match self.arbiter.request(events) {
            FocusOutcome::Granted(handle) => {
                info!("Audio focus request was granted {:?}", handle);
                self.lease = Some(FocusLease { handle, acquired: true });
                self.telemetry.record(TelemetryEvent::Focus(FocusEventKind::Granted));
            }
            FocusOutcome::Delayed(handle) => {
                info!("Audio focus request was delayed {:?}", handle);
                self.lease = Some(FocusLease { handle, acquired: false });
                self.telemetry.record(TelemetryEvent::Focus(FocusEventKind::Delayed));
            }
            FocusOutcome::Failed => {
                warn!("Unable to request audio focus, utterance:{} plays without it", id);
                self.lease = None;
                self.telemetry.record(TelemetryEvent::Focus(FocusEventKind::Failed));
            }
        }
    }

    pub fn on_done(&mut self, id: UtteranceId) {
        info!("Done playing utterance:{} {:?}", id, self.lease);
        self.record_stage(id, UtteranceStage::Done);

        if self.last_enqueued != Some(id) {
            return;
        }
        if let Some(lease) = self.lease.take() {
            info!("Abandoning audio focus {:?}", lease.handle);
            self.arbiter.release(lease.handle);
            self.telemetry.record(TelemetryEvent::Focus(FocusEventKind::Released));
        }
    }

    /// Logged only. The lease stays where it is: a later utterance may still need it.
    pub fn on_error(&mut self, id: UtteranceId, code: Option<i32>) {
        match code {
            Some(code) => error!("Error playing utterance:{} code:{}", id, code),
            None => error!("Error playing utterance:{}", id),
        }
        self.record_stage(id, UtteranceStage::Failed { code });
    }

    pub fn on_focus_change(&mut self, change: FocusChange) {
        debug!("Audio focus changed to {:?}", change);
        if change == FocusChange::Gain {
            if let Some(lease) = self.lease.as_mut() {
                lease.acquired = true;
            }
        }
    }

    /// The utterance never reached the backend.
    pub fn mark_dropped(&mut self, id: UtteranceId) {
        self.record_stage(id, UtteranceStage::Dropped);
    }

    /// Best-effort release on the way out.
    pub fn shutdown(&mut self) {
        if let Some(lease) = self.lease.take() {
            info!("Releasing audio focus {:?} on shutdown", lease.handle);
            self.arbiter.release(lease.handle);
            self.telemetry.record(TelemetryEvent::Focus(FocusEventKind::Released));
        }
    }

    fn record_stage(&self, id: UtteranceId, stage: UtteranceStage) {
        self.telemetry
            .record(TelemetryEvent::UtteranceLifecycle { id, stage });
    }
}
