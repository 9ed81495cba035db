use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = AnchorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed playback broadcast: {0}")]
    Ingress(#[from] serde_json::Error),

    #[error("voice is no longer accepting utterances")]
    VoiceUnavailable,

    #[error("decision engine is no longer accepting updates")]
    AnchorUnavailable,

    #[error("synthesis backend `{backend}` failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: std::io::Error,
    },

    #[error("radio service is not running")]
    NotRunning,
}
