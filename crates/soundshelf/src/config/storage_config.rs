use crate::config::{default_recording_dir_name, default_registry_file_name};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where recordings and the registry live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for recordings and registry (None = platform data directory).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory under the root holding the `.wav` files.
    #[serde(default = "default_recording_dir_name")]
    pub recording_dir_name: String,

    /// Registry file under the root.
    #[serde(default = "default_registry_file_name")]
    pub registry_file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            recording_dir_name: default_recording_dir_name(),
            registry_file_name: default_registry_file_name(),
        }
    }
}
