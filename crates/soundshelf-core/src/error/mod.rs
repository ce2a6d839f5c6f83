use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Clip capture, persistence, and loading errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No capture device found {location}")]
    NoCaptureDevice {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Capture device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading, creating, or appending to the registry file failed.
    #[error("Registry error at {path:?}: {source} {location}")]
    Registry {
        /// Path of the registry file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recording directory could not be created.
    #[error("Storage error at {path:?}: {source} {location}")]
    Storage {
        /// Path of the recording directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session settings are out of range.
    #[error("Invalid session settings: {reason} {location}")]
    InvalidSettings {
        /// Which setting was rejected and why.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A registry entry cannot be represented as a single registry line.
    #[error("Invalid registry entry: {reason} {location}")]
    InvalidEntry {
        /// Why the entry was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing a clip to its WAV file failed.
    #[error("Failed to encode {path:?}: {reason} {location}")]
    Encode {
        /// Destination path of the WAV file.
        path: PathBuf,
        /// Description of the encode failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading a WAV file back into a clip failed.
    #[error("Failed to decode {path:?}: {source} {location}")]
    Decode {
        /// Path of the WAV file.
        path: PathBuf,
        /// What was wrong with the container.
        #[source]
        source: DecodeError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The background load task could not be run to completion.
    #[error("Clip load task failed: {reason} {location}")]
    LoadTaskFailed {
        /// Description of the task failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Why a WAV container was rejected.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with a `RIFF`/`WAVE` header.
    #[error("Not a RIFF/WAVE file")]
    NotRiff,

    /// The RIFF size field disagrees with the file length.
    #[error("RIFF chunk declares {declared} bytes but file holds {actual}")]
    ChunkSizeMismatch {
        /// Bytes declared by the RIFF header.
        declared: u64,
        /// Bytes actually following the RIFF header.
        actual: u64,
    },

    /// The `fmt ` chunk names a codec other than integer PCM.
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat {
        /// Description of the unsupported format.
        reason: String,
    },

    /// The sample rate is not the fixed capture rate.
    #[error("Unsupported sample rate: {found} Hz")]
    UnsupportedSampleRate {
        /// Sample rate found in the `fmt ` chunk.
        found: u32,
    },

    /// The bit depth cannot be mapped to PCM samples.
    #[error("Unsupported bit depth: {bits}")]
    UnsupportedBitDepth {
        /// Bits per sample found in the `fmt ` chunk.
        bits: u16,
    },

    /// The `data` chunk ends before its declared length.
    #[error("Data chunk truncated: expected {expected} samples, read {read}")]
    Truncated {
        /// Samples declared by the `data` chunk.
        expected: u32,
        /// Samples actually present.
        read: u32,
    },

    /// Any other structural problem reported by the parser.
    #[error("Malformed WAV: {reason}")]
    Malformed {
        /// Description of the problem.
        reason: String,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
