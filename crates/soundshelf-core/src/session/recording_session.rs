//! The RECORDING/STOPPED state machine.
//!
//! One session exists per process and is the sole owner of the capture
//! device. It never touches a UI directly: every change is published as a
//! [`SessionEvent`] on an unbounded channel that the presentation layer
//! drains.

use crate::{
    CoreError, CoreResult, MaterializedClip, PcmBuffer, WavCodec,
    audio::{ActiveCapture, CaptureDevice, max_samples},
    library::{ClipNamer, ClipStore, RegistryEntry},
    session::{AffordanceState, SessionEvent, SpawnPosition},
};

use std::{
    fs,
    panic::Location,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Longest recording a session accepts, in seconds.
pub const MAX_RECORDING_LENGTH_SECS: u32 = 60 * 60;

/// Externally visible session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Capturing from the microphone.
    Recording,
    /// Idle; may hold an unsaved clip.
    Stopped,
}

/// Tunables fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Maximum length of one recording, in seconds.
    pub recording_length_secs: u32,
}

impl SessionSettings {
    /// Reject lengths outside `1..=MAX_RECORDING_LENGTH_SECS`.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        if self.recording_length_secs == 0
            || self.recording_length_secs > MAX_RECORDING_LENGTH_SECS
        {
            return Err(CoreError::InvalidSettings {
                reason: format!(
                    "recording_length_secs must be between 1 and {}, got {}",
                    MAX_RECORDING_LENGTH_SECS, self.recording_length_secs
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    /// Maximum length of one recording.
    pub fn recording_length(&self) -> Duration {
        Duration::from_secs(u64::from(self.recording_length_secs))
    }
}

/// Result of [`RecordingSession::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The clip was written and registered.
    Saved {
        /// The registry line that was appended.
        entry: RegistryEntry,
        /// Where the WAV file was written.
        path: PathBuf,
    },
    /// There was no clip to save; nothing was written.
    NothingToSave,
}

enum Phase<C> {
    Stopped,
    Recording {
        capture: C,
        take_id: Uuid,
        started_at: Instant,
    },
}

/// Recording state machine over a [`CaptureDevice`].
pub struct RecordingSession<D: CaptureDevice> {
    device: D,
    phase: Phase<D::Capture>,
    active_clip: Option<PcmBuffer>,
    settings: SessionSettings,
    store: Arc<ClipStore>,
    namer: ClipNamer,
    events: mpsc::UnboundedSender<SessionEvent>,
    library_loading: bool,
}

impl<D: CaptureDevice> RecordingSession<D> {
    /// Enter STOPPED with no clip and publish the initial affordances.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSettings`] when `settings` are out of range.
    #[track_caller]
    #[instrument(skip_all, fields(recording_length_secs = settings.recording_length_secs))]
    pub fn initialize(
        device: D,
        store: Arc<ClipStore>,
        settings: SessionSettings,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> CoreResult<Self> {
        settings.validate()?;

        let session = Self {
            device,
            phase: Phase::Stopped,
            active_clip: None,
            settings,
            store,
            namer: ClipNamer::new(),
            events,
            library_loading: false,
        };

        session.publish_affordances();
        info!("Recording session initialized");

        Ok(session)
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Stopped => SessionState::Stopped,
            Phase::Recording { .. } => SessionState::Recording,
        }
    }

    /// Controls implied by the current state.
    pub fn affordances(&self) -> AffordanceState {
        AffordanceState::for_session(
            self.state(),
            self.active_clip.is_some(),
            self.library_loading,
        )
    }

    /// True while the saved library is still being restored.
    pub fn is_library_loading(&self) -> bool {
        self.library_loading
    }

    /// Mark the startup library load as running or finished and republish
    /// the affordances.
    #[instrument(skip(self))]
    pub fn set_library_loading(&mut self, loading: bool) {
        self.library_loading = loading;
        self.publish_affordances();
    }

    /// The unsaved clip, if any.
    pub fn active_clip(&self) -> Option<&PcmBuffer> {
        self.active_clip.as_ref()
    }

    /// Session tunables.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// How long the current take has been running.
    pub fn recording_elapsed(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Recording { started_at, .. } => Some(started_at.elapsed()),
            Phase::Stopped => None,
        }
    }

    /// Start a new take. Does nothing while already recording.
    ///
    /// Any unsaved clip is replaced by the new take.
    ///
    /// # Errors
    ///
    /// Returns the device error if capture cannot start; the session stays
    /// STOPPED and keeps its clip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn to_recording(&mut self) -> CoreResult<()> {
        if matches!(self.phase, Phase::Recording { .. }) {
            debug!("Already recording, ignoring start");
            return Ok(());
        }

        let limit = max_samples(self.settings.recording_length_secs, self.device.channels());
        let capture = self.device.begin(limit)?;

        if let Some(dropped) = self.active_clip.take() {
            info!(frames = dropped.frames(), "Unsaved clip replaced by new take");
        }

        let take_id = Uuid::new_v4();
        self.phase = Phase::Recording {
            capture,
            take_id,
            started_at: Instant::now(),
        };

        self.publish_affordances();
        info!(take_id = %take_id, max_samples = limit, "Recording started");

        Ok(())
    }

    /// End the current take and keep what was captured as the active clip.
    /// Does nothing while already stopped.
    ///
    /// The device is released whether or not collecting the samples succeeds.
    /// An empty capture leaves no active clip.
    ///
    /// # Errors
    ///
    /// Returns the device error if the samples could not be collected; the
    /// session is STOPPED with no active clip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn to_stopped(&mut self) -> CoreResult<()> {
        let Phase::Recording {
            capture,
            take_id,
            started_at,
        } = std::mem::replace(&mut self.phase, Phase::Stopped)
        else {
            debug!("Already stopped, ignoring stop");
            return Ok(());
        };

        let result = capture.finish();

        let outcome = match result {
            Ok(pcm) if pcm.is_empty() => {
                warn!(take_id = %take_id, "Recording stopped with no audio captured");
                self.active_clip = None;
                Ok(())
            }
            Ok(pcm) => {
                info!(
                    take_id = %take_id,
                    frames = pcm.frames(),
                    elapsed_ms = started_at.elapsed().as_millis(),
                    "Recording stopped"
                );
                self.active_clip = Some(pcm);
                Ok(())
            }
            Err(e) => {
                self.active_clip = None;
                Err(e)
            }
        };

        self.publish_affordances();
        outcome
    }

    /// Drop the active clip without saving it. State is unchanged.
    #[instrument(skip(self))]
    pub fn discard(&mut self) {
        if self.active_clip.take().is_some() {
            info!("Active clip discarded");
        }
        self.publish_affordances();
    }

    /// Write the active clip to disk, register it, and hand it to the scene.
    ///
    /// The WAV file is fully written before the registry line is appended, so
    /// the registry never points at a missing file.
    ///
    /// # Errors
    ///
    /// On an encode or registry failure nothing is registered, the active clip
    /// is kept, and the affordances are unchanged, so the save can be retried.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&mut self, spawn_position: SpawnPosition) -> CoreResult<SaveOutcome> {
        let Some(pcm) = self.active_clip.take() else {
            debug!("Nothing to save");
            return Ok(SaveOutcome::NothingToSave);
        };

        let (entry, path) = match self.persist(&pcm) {
            Ok(saved) => saved,
            Err(e) => {
                self.active_clip = Some(pcm);
                return Err(e);
            }
        };

        info!(filename = %entry, frames = pcm.frames(), "Clip saved");

        let materialized = SessionEvent::ClipMaterialized {
            clip: MaterializedClip {
                pcm,
                source_entry: entry.clone(),
            },
            spawn_position,
        };
        if self.events.send(materialized).is_err() {
            debug!(filename = %entry, "Event receiver closed, saved clip not presented");
        }
        self.publish_affordances();

        Ok(SaveOutcome::Saved { entry, path })
    }

    /// Encode, then register. A clip whose registry append fails is removed
    /// again so no unindexed file is left behind.
    #[track_caller]
    fn persist(&mut self, pcm: &PcmBuffer) -> CoreResult<(RegistryEntry, PathBuf)> {
        let entry = self.namer.next_entry()?;
        let path = self.store.clip_path(&entry)?;

        WavCodec::encode(pcm, &path)?;

        if let Err(e) = self.store.registry().append(&entry) {
            if let Err(remove_err) = fs::remove_file(&path) {
                warn!(path = ?path, error = %remove_err, "Failed to remove unregistered clip");
            }
            return Err(e);
        }

        Ok((entry, path))
    }

    fn publish_affordances(&self) {
        let affordances = self.affordances();
        if self.events.send(SessionEvent::Affordances(affordances)).is_err() {
            debug!("Event receiver closed, affordance update dropped");
        }
    }
}
