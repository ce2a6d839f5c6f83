use soundshelf_core::CoreError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors surfaced by the soundshelf binary.
///
/// Each variant records where it was raised.
#[derive(Error, Debug)]
pub enum AppError {
    /// Capture, persistence, or loading error from soundshelf-core.
    #[error("Core error: {source} {location}")]
    Core {
        /// The error raised by the session, store, or loader.
        #[source]
        source: CoreError,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// The application loop stopped accepting commands.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Which command could not be delivered.
        message: String,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// Configuration loading, saving, or validation error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// What was wrong with the file or a value in it.
        reason: String,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// Filesystem error outside the clip store.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The failed operation's error.
        #[source]
        source: std::io::Error,
        /// Where the error was raised.
        location: ErrorLocation,
    },
}

// #[from] cannot fill in `location`.
impl From<CoreError> for AppError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        AppError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result with [`AppError`].
pub type Result<T> = StdResult<T, AppError>;
