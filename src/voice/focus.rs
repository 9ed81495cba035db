use tracing::{info, warn};

use super::backend::VoiceEventSink;

/// Opaque token returned by the arbiter for a live claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    Granted(FocusHandle),
    /// The arbiter knows about the claim and will grant it later.
    Delayed(FocusHandle),
    Failed,
}

/// Platform broker for exclusive or ducking access to the audio output.
///
/// `release` is not assumed idempotent: callers must only pass a handle they
/// currently hold, and only once.
pub trait AudioArbiter: Send + 'static {
    /// `events` lets the arbiter report later focus changes for this claim.
    fn request(&mut self, events: &VoiceEventSink) -> FocusOutcome;

    fn release(&mut self, handle: FocusHandle);
}

/// Grants every request and does nothing else.
/// Used when the platform has no focus broker.
#[derive(Debug, Default)]
pub struct PassiveArbiter {
    next: u64,
}

impl PassiveArbiter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioArbiter for PassiveArbiter {
    fn request(&mut self, _events: &VoiceEventSink) -> FocusOutcome {
        self.next += 1;
        FocusOutcome::Granted(FocusHandle(self.next))
    }

    fn release(&mut self, _handle: FocusHandle) {}
}

/// Ducks the music with an external command (e.g. `playerctl volume 0.3`)
/// and restores it on release.
#[derive(Debug, Default)]
pub struct CommandArbiter {
    duck: Option<Vec<String>>,
    restore: Option<Vec<String>>,
    next: u64,
}

impl CommandArbiter {
    pub fn new(duck: Option<Vec<String>>, restore: Option<Vec<String>>) -> Self {
        Self {
            duck,
            restore,
            next: 0,
        }
    }
}

impl AudioArbiter for CommandArbiter {
    fn request(&mut self, _events: &VoiceEventSink) -> FocusOutcome {
        if let Some(command) = &self.duck {
            if let Err(e) = run_detached(command) {
                warn!("Duck command {:?} failed: {}", command, e);
                return FocusOutcome::Failed;
            }
        }
        self.next += 1;
        FocusOutcome::Granted(FocusHandle(self.next))
    }

    fn release(&mut self, handle: FocusHandle) {
        if let Some(command) = &self.restore {
            if let Err(e) = run_detached(command) {
                warn!("Restore command {:?} failed for {:?}: {}", command, handle, e);
            }
        }
    }
}

/// Spawns without waiting; tokio reaps the child once it exits.
fn run_detached(command: &[String]) -> std::io::Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty command line",
        ));
    };
    info!("Running focus command: {} {:?}", program, args);
    tokio::process::Command::new(program).args(args).spawn()?;
    Ok(())
}
