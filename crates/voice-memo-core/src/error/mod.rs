use crate::audio::AudioEncoding;

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording and playback collaborator errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device found.
    #[error("No output device found {location}")]
    NoOutputDevice {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The requested encoding cannot be produced by this recorder.
    #[error("Unsupported encoding: {encoding:?} {location}")]
    UnsupportedEncoding {
        /// The rejected encoding.
        encoding: AudioEncoding,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recording was started before an output path was prepared.
    #[error("Recording not prepared {location}")]
    NotPrepared {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A pause, resume or stop arrived with no active capture stream.
    #[error("Not recording {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback was requested before a sound finished loading.
    #[error("No sound loaded {location}")]
    SoundNotLoaded {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The player reported an unsuccessful playback.
    #[error("Playback failed: {path:?} {location}")]
    PlaybackFailed {
        /// Sound that failed to play.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Sample rate conversion for playback failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading or writing the WAV container failed.
    #[error("WAV error: {source} {location}")]
    Wav {
        /// Underlying hound error.
        #[source]
        source: hound::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

// Manual conversions so the caller location is captured.
impl From<hound::Error> for CoreError {
    #[track_caller]
    fn from(source: hound::Error) -> Self {
        CoreError::Wav {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
