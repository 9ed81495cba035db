use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use radio_anchor::ingress::read_broadcasts;
use radio_anchor::voice::{AudioArbiter, CommandArbiter, CommandBackend, PassiveArbiter};
use radio_anchor::{AnchorConfig, RadioService};

/// Radio anchor: announces track changes read as JSON lines on stdin.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file. Defaults apply when it does not exist.
    #[arg(long, default_value = "radio-anchor.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    // 2. Load Config
    let config = AnchorConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Radio Anchor booting with voice '{}'", config.voice.program);

    // 3. Voice + Focus
    let backend = CommandBackend::new(&config.voice);
    let arbiter: Box<dyn AudioArbiter> = if config.focus.duck.is_some() || config.focus.restore.is_some() {
        Box::new(CommandArbiter::new(
            config.focus.duck.clone(),
            config.focus.restore.clone(),
        ))
    } else {
        Box::new(PassiveArbiter::new())
    };

    // 4. Go On Air
    let mut service = RadioService::new(config);
    let ingress = service.start(Box::new(backend), arbiter);

    // 5. Stdin Broadcasts
    let cancel = CancellationToken::new();
    let reader = tokio::spawn(read_broadcasts(
        BufReader::new(tokio::io::stdin()),
        ingress,
        cancel.clone(),
    ));

    tracing::info!("Radio Anchor active. Press Ctrl+C to stop.");
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("Failed to listen for Ctrl+C")?;
            tracing::info!("Ctrl+C received, going off air");
        }
        res = reader => {
            res.context("Broadcast reader panicked")??;
            tracing::info!("Broadcast stream ended, going off air");
        }
    }
    cancel.cancel();

    // 6. Shutdown
    service.stop().await.context("Failed to stop radio service")?;
    let snapshot = service.telemetry().snapshot();
    tracing::info!(
        "Session summary: {} updates, {} announcements, {} utterances failed",
        snapshot.decision_stats.updates,
        snapshot.decision_stats.announcements,
        snapshot.utterance_stats.failed
    );

    Ok(())
}
