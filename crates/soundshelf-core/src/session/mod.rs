mod events;
mod recording_session;

pub use {
    events::{AffordanceState, SessionEvent, SpawnArea, SpawnPosition},
    recording_session::{
        MAX_RECORDING_LENGTH_SECS, RecordingSession, SaveOutcome, SessionSettings, SessionState,
    },
};
