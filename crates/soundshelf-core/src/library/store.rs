use crate::{CoreError, CoreResult, library::{ClipRegistry, RegistryEntry}};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// The flat recording directory paired with the registry that indexes it.
pub struct ClipStore {
    recording_dir: PathBuf,
    registry: ClipRegistry,
}

impl ClipStore {
    /// Open the store, creating the recording directory if needed.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn open(
        recording_dir: impl Into<PathBuf>,
        registry_path: impl Into<PathBuf>,
    ) -> CoreResult<Self> {
        let recording_dir = recording_dir.into();

        fs::create_dir_all(&recording_dir).map_err(|source| CoreError::Storage {
            path: recording_dir.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let registry = ClipRegistry::new(registry_path);

        debug!(
            recording_dir = ?recording_dir,
            registry = ?registry.path(),
            "Clip store opened"
        );

        Ok(Self {
            recording_dir,
            registry,
        })
    }

    /// Directory holding the `.wav` files.
    pub fn recording_dir(&self) -> &Path {
        &self.recording_dir
    }

    /// The registry indexing the recording directory.
    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    /// Where the clip named by `entry` lives.
    ///
    /// Only bare filenames resolve; anything that would leave the flat
    /// recording directory is rejected.
    #[track_caller]
    pub fn clip_path(&self, entry: &RegistryEntry) -> CoreResult<PathBuf> {
        let name = Path::new(entry.filename());

        if name.file_name() != Some(name.as_os_str()) {
            return Err(CoreError::InvalidEntry {
                reason: format!("{:?} is not a bare filename", entry.filename()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(self.recording_dir.join(name))
    }
}
