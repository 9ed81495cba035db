use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::VoiceConfig;
use crate::error::{AnchorError, Result};
use crate::kernel::event::{FocusChange, Utterance, UtteranceId, VoiceEvent};

/// Callback side of the voice actor's mailbox.
/// Cheap to clone and usable from any thread, async or not.
#[derive(Debug, Clone)]
pub struct VoiceEventSink {
    tx: mpsc::UnboundedSender<VoiceEvent>,
}

impl VoiceEventSink {
    pub fn new(tx: mpsc::UnboundedSender<VoiceEvent>) -> Self {
        Self { tx }
    }

    pub fn started(&self, id: UtteranceId) {
        self.send(VoiceEvent::Started(id));
    }

    pub fn done(&self, id: UtteranceId) {
        self.send(VoiceEvent::Done(id));
    }

    pub fn error(&self, id: UtteranceId, code: Option<i32>) {
        self.send(VoiceEvent::Error { id, code });
    }

    pub fn focus_changed(&self, change: FocusChange) {
        self.send(VoiceEvent::FocusChanged(change));
    }

    pub fn send(&self, event: VoiceEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Voice actor gone, dropping {:?}", e.0);
        }
    }
}

/// Text-to-speech engine.
///
/// Contract: utterances are rendered in submission order, each one reports
/// `started` at most once and then exactly one of `done` / `error`.
pub trait SynthesisBackend: Send + 'static {
    fn name(&self) -> &str;

    /// Called once by the voice actor before any `speak`.
    /// An error leaves the voice "not ready".
    fn init(&mut self, events: VoiceEventSink) -> Result<()>;

    /// Queue one utterance. Must not wait for playback.
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;
}

/// Speaks through an external program (`say`, `espeak`, `spd-say --wait`...),
/// one process per utterance, strictly one after the other.
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    queue: Option<mpsc::UnboundedSender<Utterance>>,
}

impl CommandBackend {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            queue: None,
        }
    }

    fn unavailable(&self, reason: &str) -> AnchorError {
        AnchorError::Backend {
            backend: self.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, reason.to_string()),
        }
    }
}

impl SynthesisBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.program
    }

    fn init(&mut self, events: VoiceEventSink) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| AnchorError::Backend {
            backend: self.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(speak_worker(self.program.clone(), self.args.clone(), rx, events));
        self.queue = Some(tx);
        Ok(())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| self.unavailable("backend not initialized"))?;
        queue
            .send(utterance.clone())
            .map_err(|_| self.unavailable("speak worker stopped"))
    }
}

async fn speak_worker(
    program: String,
    args: Vec<String>,
    mut rx: mpsc::UnboundedReceiver<Utterance>,
    events: VoiceEventSink,
) {
    info!("Speak worker started for '{}'", program);

    while let Some(utterance) = rx.recv().await {
        events.started(utterance.id);

        let status = Command::new(&program)
            .args(&args)
            .arg(&utterance.text)
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => events.done(utterance.id),
            Ok(status) => events.error(utterance.id, status.code()),
            Err(e) => {
                warn!("Failed to spawn '{}': {}", program, e);
                events.error(utterance.id, None);
            }
        }
    }

    info!("Speak worker for '{}' stopped", program);
}
