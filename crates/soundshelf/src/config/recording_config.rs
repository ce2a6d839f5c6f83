use crate::config::{default_channels, default_recording_length_secs};

use serde::{Deserialize, Serialize};

/// Capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Maximum length of one recording, in seconds.
    #[serde(default = "default_recording_length_secs")]
    pub recording_length_secs: u32,

    /// Channels to capture.
    #[serde(default = "default_channels")]
    pub channels: u16,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            recording_length_secs: default_recording_length_secs(),
            channels: default_channels(),
        }
    }
}
