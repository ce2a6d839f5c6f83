//! Soundshelf Core Library
//!
//! Microphone clip capture, WAV persistence behind an append-only registry,
//! and background reconstruction of saved clips.
//!
//! # Example
//!
//! ```no_run
//! use soundshelf_core::{
//!     ClipStore, CoreResult, CpalCaptureDevice, RecordingSession, SessionSettings, SpawnPosition,
//! };
//!
//! use std::{sync::Arc, thread::sleep, time::Duration};
//!
//! fn main() -> CoreResult<()> {
//!     let store = Arc::new(ClipStore::open("micRecordings", "myRecordings.txt")?);
//!     let device = CpalCaptureDevice::first_available(1)?;
//!     let (events_tx, _events_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let settings = SessionSettings { recording_length_secs: 10 };
//!
//!     let mut session = RecordingSession::initialize(device, store, settings, events_tx)?;
//!
//!     session.to_recording()?;
//!     sleep(Duration::from_secs(2));
//!     session.to_stopped()?;
//!     session.save(SpawnPosition::default())?;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod library;
mod session;

pub use {
    audio::{
        ActiveCapture, BITS_PER_SAMPLE, CaptureDevice, CpalCapture, CpalCaptureDevice, PcmBuffer,
        SAMPLE_RATE, WavCodec, max_samples,
    },
    error::{CoreError, DecodeError, Result as CoreResult},
    library::{
        ClipLoad, ClipLoader, ClipNamer, ClipRegistry, ClipStore, LoadSummary, MaterializedClip,
        RegistryEntry,
    },
    session::{
        AffordanceState, MAX_RECORDING_LENGTH_SECS, RecordingSession, SaveOutcome, SessionEvent,
        SessionSettings, SessionState, SpawnArea, SpawnPosition,
    },
};
