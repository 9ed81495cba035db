use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::backend::{SynthesisBackend, VoiceEventSink};
use super::controller::FocusController;
use super::focus::AudioArbiter;
use crate::error::{AnchorError, Result};
use crate::kernel::event::{Utterance, UtteranceId, VoiceEvent};
use crate::kernel::telemetry::Telemetry;

enum VoiceCommand {
    Enqueue {
        text: String,
        reply: oneshot::Sender<Utterance>,
    },
    Status(oneshot::Sender<VoiceStatus>),
    Shutdown(oneshot::Sender<()>),
}

/// Point-in-time view of the voice actor, for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStatus {
    pub session: Uuid,
    pub issued: u64,
    pub last_enqueued: Option<UtteranceId>,
    pub lease_held: bool,
    pub ready: bool,
}

/// Producer side of the voice actor. Clone freely.
#[derive(Clone)]
pub struct VoiceHandle {
    commands: mpsc::Sender<VoiceCommand>,
    events: VoiceEventSink,
}

impl VoiceHandle {
    /// Queue `text` behind every message enqueued before it.
    /// Suspends only while the hand-off channel is full, never for playback.
    pub async fn enqueue(&self, text: impl Into<String>) -> Result<Utterance> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(VoiceCommand::Enqueue {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| AnchorError::VoiceUnavailable)?;
        rx.await.map_err(|_| AnchorError::VoiceUnavailable)
    }

    /// Reflects every callback sent through `events()` before this call.
    pub async fn status(&self) -> Result<VoiceStatus> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(VoiceCommand::Status(reply))
            .await
            .map_err(|_| AnchorError::VoiceUnavailable)?;
        rx.await.map_err(|_| AnchorError::VoiceUnavailable)
    }

    /// Stops the actor after a best-effort focus release.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(VoiceCommand::Shutdown(reply))
            .await
            .map_err(|_| AnchorError::VoiceUnavailable)?;
        rx.await.map_err(|_| AnchorError::VoiceUnavailable)
    }

    /// Callback entry point, the same one the backend receives in `init`.
    pub fn events(&self) -> VoiceEventSink {
        self.events.clone()
    }
}

struct AnchorVoice {
    controller: FocusController,
    backend: Box<dyn SynthesisBackend>,
    ready: bool,
    sink: VoiceEventSink,
    commands: mpsc::Receiver<VoiceCommand>,
    events: mpsc::UnboundedReceiver<VoiceEvent>,
}

/// Starts the voice actor on the current runtime.
/// `capacity` bounds the enqueue hand-off channel.
pub fn spawn(
    backend: Box<dyn SynthesisBackend>,
    arbiter: Box<dyn AudioArbiter>,
    capacity: usize,
    telemetry: Telemetry,
) -> (VoiceHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity.max(1));
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let sink = VoiceEventSink::new(event_tx);

    let actor = AnchorVoice {
        controller: FocusController::new(arbiter, telemetry),
        backend,
        ready: false,
        sink: sink.clone(),
        commands: cmd_rx,
        events: event_rx,
    };

    let handle = VoiceHandle {
        commands: cmd_tx,
        events: sink,
    };
    (handle, tokio::spawn(actor.run()))
}

impl AnchorVoice {
    async fn run(mut self) {
        info!(
            "Voice session {} using synthesis backend '{}'",
            self.controller.session(),
            self.backend.name()
        );
        match self.backend.init(self.sink.clone()) {
            Ok(()) => self.ready = true,
            Err(e) => error!("Failed to initialize synthesis backend: {}", e),
        }

        loop {
            // Callbacks first: a status or enqueue sent after a callback must observe it.
            tokio::select! {
                biased;

                Some(event) = self.events.recv() => self.handle_event(event),

                command = self.commands.recv() => match command {
                    Some(VoiceCommand::Enqueue { text, reply }) => {
                        let utterance = self.enqueue(text);
                        let _ = reply.send(utterance);
                    }
                    Some(VoiceCommand::Status(reply)) => {
                        let _ = reply.send(self.status());
                    }
                    Some(VoiceCommand::Shutdown(reply)) => {
                        self.controller.shutdown();
                        let _ = reply.send(());
                        break;
                    }
                    None => {
                        self.controller.shutdown();
                        break;
                    }
                },
            }
        }

        info!("Voice session {} stopped", self.controller.session());
    }

    fn enqueue(&mut self, text: String) -> Utterance {
        let utterance = self.controller.next_utterance(text);

        if !self.ready {
            warn!("Voice not ready, dropping utterance:{}", utterance.id);
            self.controller.mark_dropped(utterance.id);
            return utterance;
        }

        match self.backend.speak(&utterance) {
            Ok(()) => {
                info!("Starting utterance:{} msg:“{}”", utterance.id, utterance.text);
                self.controller.mark_enqueued(utterance.id);
            }
            Err(e) => {
                warn!("Backend refused utterance:{}: {}", utterance.id, e);
                self.controller.on_error(utterance.id, None);
            }
        }
        utterance
    }

    fn handle_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::Started(id) => self.controller.on_start(id, &self.sink),
            VoiceEvent::Done(id) => self.controller.on_done(id),
            VoiceEvent::Error { id, code } => self.controller.on_error(id, code),
            VoiceEvent::FocusChanged(change) => self.controller.on_focus_change(change),
        }
    }

    fn status(&self) -> VoiceStatus {
        VoiceStatus {
            session: self.controller.session(),
            issued: self.controller.issued(),
            last_enqueued: self.controller.last_enqueued(),
            lease_held: self.controller.lease().is_some(),
            ready: self.ready,
        }
    }
}
