//! Anchor telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel for the decision engine and the voice actor.
//! Neither of them ever reads it back to decide anything.
//!
//! # PRIVACY INVARIANT
//! Events must **NEVER** carry track text or spoken messages.
//! Only utterance ids, template families, outcomes and counts are allowed.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use recorder::{Telemetry, TelemetryRecorder};
