//! Configuration management for soundshelf.
//!
//! One TOML file under the platform config directory. Missing keys take
//! their defaults, and values are checked by [`Config::validate`] before
//! anything else starts.

use crate::{
    AppError, AppResult,
    config::{RecordingConfig, SpawnConfig, StorageConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use soundshelf_core::{SessionSettings, SpawnArea};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Recording directory and registry locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Capture settings.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Scene placement settings.
    #[serde(default)]
    pub spawn: SpawnConfig,
}

/// Resolved on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Directory holding the `.wav` files.
    pub recording_dir: PathBuf,
    /// The registry file.
    pub registry_path: PathBuf,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `config_path`, creating a default file there
    /// if none exists.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!(config_path = ?config_path, "Writing default configuration");
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(config_path)
            .map_err(|e| config_error(format!("Cannot read {}: {}", config_path.display(), e)))?;

        let config = toml::from_str::<Config>(&raw)
            .map_err(|e| config_error(format!("Invalid TOML in {}: {}", config_path.display(), e)))?;

        debug!(config_path = ?config_path, "Configuration read");

        Ok(config)
    }

    /// Check every value before anything is opened.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        self.session_settings().validate()?;

        if self.recording.channels == 0 {
            return Err(config_error(
                "recording.channels must be at least 1".to_string(),
            ));
        }

        for (key, name) in [
            ("storage.recording_dir_name", &self.storage.recording_dir_name),
            ("storage.registry_file_name", &self.storage.registry_file_name),
        ] {
            let as_path = Path::new(name.as_str());
            if name.trim().is_empty() || as_path.file_name() != Some(as_path.as_os_str()) {
                return Err(config_error(format!(
                    "{} must be a plain name, got {:?}",
                    key, name
                )));
            }
        }

        if !self.spawn.half_extent.is_finite() || self.spawn.half_extent < 0.0 {
            return Err(config_error(format!(
                "spawn.half_extent must be a non-negative number, got {}",
                self.spawn.half_extent
            )));
        }

        Ok(())
    }

    /// Session tunables derived from `[recording]`.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            recording_length_secs: self.recording.recording_length_secs,
        }
    }

    /// Spawn area derived from `[spawn]`.
    pub fn spawn_area(&self) -> SpawnArea {
        SpawnArea::new(self.spawn.half_extent)
    }

    /// Resolve the recording directory and registry file.
    #[track_caller]
    pub fn storage_paths(&self) -> AppResult<StoragePaths> {
        let data_dir = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => Self::project_dirs()?.data_dir().to_path_buf(),
        };

        Ok(StoragePaths {
            recording_dir: data_dir.join(&self.storage.recording_dir_name),
            registry_path: data_dir.join(&self.storage.registry_file_name),
        })
    }

    /// Write the configuration to `config_path`.
    ///
    /// The TOML goes to `config.toml.tmp` and is synced before being renamed
    /// over the real file, so readers only ever see a whole file.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| config_error(format!("Cannot serialize configuration: {}", e)))?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = config_path.with_extension("toml.tmp");

        let written = fs::File::create(&staging).and_then(|mut file| {
            file.write_all(rendered.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&staging, config_path)) {
            let _ = fs::remove_file(&staging);
            return Err(config_error(format!(
                "Cannot write {}: {}",
                config_path.display(),
                e
            )));
        }

        info!(config_path = ?config_path, "Configuration written");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "soundshelf", "Soundshelf")
            .ok_or_else(|| config_error("No home directory to place configuration in".to_string()))
    }
}

#[track_caller]
fn config_error(reason: String) -> AppError {
    AppError::ConfigError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
