pub mod config;
pub mod error;
pub mod ingress;
pub mod kernel;
pub mod service;
pub mod voice;

// Re-export specific items for convenient access
pub use config::AnchorConfig;
pub use error::{AnchorError, Result};
pub use kernel::anchor::{Announcement, AnnouncementSession, RadioAnchor};
pub use kernel::event::{TrackUpdate, Utterance, UtteranceId, VoiceEvent};
pub use kernel::track::{Track, TrackState};
pub use service::RadioService;
