use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};

/// Minimum interval between two greeting-eligibility checks.
pub const ANNOUNCEMENT_COOLDOWN_SECS: u64 = 20 * 60;

pub const DEFAULT_VOICE_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub cooldown_secs: u64,
    /// Bound on messages handed to the voice but not yet picked up by it.
    pub voice_queue_capacity: usize,
    /// Fixed seed for template selection; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub voice: VoiceConfig,
    pub focus: FocusConfig,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: ANNOUNCEMENT_COOLDOWN_SECS,
            voice_queue_capacity: DEFAULT_VOICE_QUEUE_CAPACITY,
            seed: None,
            voice: VoiceConfig::default(),
            focus: FocusConfig::default(),
        }
    }
}

impl AnchorConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| AnchorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| AnchorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Command-line speech synthesizer, e.g. `say` or `spd-say --wait`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub program: String,
    /// Arguments placed before the message text.
    pub args: Vec<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            program: "say".to_string(),
            args: Vec::new(),
        }
    }
}

/// Optional commands that duck and restore the music around a run of utterances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duck: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<Vec<String>>,
}
