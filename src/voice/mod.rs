//! Utterance queue & audio focus.
//!
//! The voice actor is the single owner of the sequence counter and the focus lease.
//! Producers (`VoiceHandle::enqueue`) and the synthesis backend callbacks
//! (`VoiceEventSink`) only ever talk to it through channels.

pub mod actor;
pub mod backend;
pub mod controller;
pub mod focus;

pub use actor::{spawn, VoiceHandle, VoiceStatus};
pub use backend::{CommandBackend, SynthesisBackend, VoiceEventSink};
pub use controller::FocusController;
pub use focus::{AudioArbiter, CommandArbiter, FocusHandle, FocusOutcome, PassiveArbiter};
