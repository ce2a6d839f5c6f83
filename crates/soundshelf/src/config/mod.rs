mod recording_config;
mod spawn_config;
mod storage_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    config::{Config, StoragePaths},
    recording_config::RecordingConfig,
    spawn_config::SpawnConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_RECORDING_DIR_NAME: &str = "micRecordings";
pub(crate) const DEFAULT_REGISTRY_FILE_NAME: &str = "myRecordings.txt";
pub(crate) const DEFAULT_RECORDING_LENGTH_SECS: u32 = 10;
pub(crate) const DEFAULT_CHANNELS: u16 = 1;
pub(crate) const DEFAULT_SPAWN_HALF_EXTENT: f32 = 5.0;

pub(crate) fn default_recording_dir_name() -> String {
    DEFAULT_RECORDING_DIR_NAME.to_string()
}

pub(crate) fn default_registry_file_name() -> String {
    DEFAULT_REGISTRY_FILE_NAME.to_string()
}

pub(crate) fn default_recording_length_secs() -> u32 {
    DEFAULT_RECORDING_LENGTH_SECS
}

pub(crate) fn default_channels() -> u16 {
    DEFAULT_CHANNELS
}

pub(crate) fn default_spawn_half_extent() -> f32 {
    DEFAULT_SPAWN_HALF_EXTENT
}
