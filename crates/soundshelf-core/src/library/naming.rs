use crate::{CoreResult, library::RegistryEntry};

use chrono::{DateTime, Utc};

const TOKEN_FORMAT: &str = "%Y%m%dT%H%M%S%3f";

/// Issues time-based clip filenames (`<token>.wav`).
///
/// Tokens come from wall-clock milliseconds and strictly increase within one
/// namer: if the clock has not advanced (or went backwards) the previous
/// token is bumped by one millisecond.
#[derive(Debug, Default)]
pub struct ClipNamer {
    last_millis: Option<i64>,
}

impl ClipNamer {
    /// Fresh namer with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name for a clip saved now.
    #[track_caller]
    pub fn next_entry(&mut self) -> CoreResult<RegistryEntry> {
        self.next_entry_at(Utc::now().timestamp_millis())
    }

    /// Name for a clip saved at `now_millis` since the Unix epoch.
    #[track_caller]
    pub fn next_entry_at(&mut self, now_millis: i64) -> CoreResult<RegistryEntry> {
        let millis = match self.last_millis {
            Some(last) if now_millis <= last => last + 1,
            _ => now_millis,
        };
        self.last_millis = Some(millis);

        RegistryEntry::new(format!("{}.wav", token(millis)))
    }
}

fn token(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(at) => at.format(TOKEN_FORMAT).to_string(),
        None => millis.to_string(),
    }
}
