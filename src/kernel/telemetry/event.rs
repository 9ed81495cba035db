use serde::{Deserialize, Serialize};

use crate::kernel::event::UtteranceId;
use crate::kernel::templates::TemplateFamily;
use crate::kernel::track::TrackState;

// Allowed: IDs, Families, Outcomes, Codes
// Forbidden: Titles, Artists, Albums, Message text

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    UpdateReceived {
        state: TrackState,
    },

    /// Update for the track that was announced last.
    DuplicateSuppressed,

    Announced {
        family: TemplateFamily,
        greeting_due: bool,
    },

    UtteranceLifecycle {
        id: UtteranceId,
        stage: UtteranceStage,
    },

    Focus(FocusEventKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtteranceStage {
    Queued,
    /// Voice was not ready, the utterance never reached the backend.
    Dropped,
    Started,
    Done,
    Failed { code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusEventKind {
    Granted,
    Delayed,
    Failed,
    Released,
}
