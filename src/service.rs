use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::AnchorConfig;
use crate::error::{AnchorError, Result};
use crate::ingress::IngressHandle;
use crate::kernel::anchor::RadioAnchor;
use crate::kernel::telemetry::Telemetry;
use crate::voice::{self, AudioArbiter, SynthesisBackend, VoiceHandle};

struct Running {
    ingress: IngressHandle,
    voice: VoiceHandle,
    cancel: CancellationToken,
    anchor_task: JoinHandle<()>,
    voice_task: JoinHandle<()>,
}

/// Wires ingress -> anchor -> voice and owns their tasks.
pub struct RadioService {
    config: AnchorConfig,
    telemetry: Telemetry,
    running: Option<Running>,
}

impl RadioService {
    pub fn new(config: AnchorConfig) -> Self {
        Self {
            config,
            telemetry: Telemetry::new(),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn telemetry(&self) -> Telemetry {
        self.telemetry.clone()
    }

    pub fn ingress(&self) -> Option<IngressHandle> {
        self.running.as_ref().map(|r| r.ingress.clone())
    }

    pub fn voice(&self) -> Option<VoiceHandle> {
        self.running.as_ref().map(|r| r.voice.clone())
    }

    /// Go on air. Starting twice keeps the first session and drops the new
    /// backend and arbiter unused.
    pub fn start(
        &mut self,
        backend: Box<dyn SynthesisBackend>,
        arbiter: Box<dyn AudioArbiter>,
    ) -> IngressHandle {
        if let Some(running) = &self.running {
            warn!("Radio service already started");
            return running.ingress.clone();
        }

        let (voice, voice_task) = voice::spawn(
            backend,
            arbiter,
            self.config.voice_queue_capacity,
            self.telemetry.clone(),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let ingress = IngressHandle::new(tx);
        let cancel = CancellationToken::new();

        let anchor = RadioAnchor::new(voice.clone(), &self.config, self.telemetry.clone());
        let anchor_task = tokio::spawn(anchor.run(rx, cancel.clone()));

        info!("Radio service started");
        self.running = Some(Running {
            ingress: ingress.clone(),
            voice,
            cancel,
            anchor_task,
            voice_task,
        });
        ingress
    }

    /// Stop accepting updates, release focus if still held, and wait for both tasks.
    pub async fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(AnchorError::NotRunning)?;

        running.cancel.cancel();
        if let Err(e) = running.anchor_task.await {
            warn!("Anchor task ended abnormally: {}", e);
        }

        // The actor may already be gone if every handle was dropped.
        if let Err(e) = running.voice.shutdown().await {
            warn!("Voice shutdown: {}", e);
        }
        if let Err(e) = running.voice_task.await {
            warn!("Voice task ended abnormally: {}", e);
        }

        info!("Radio service stopped");
        Ok(())
    }
}
