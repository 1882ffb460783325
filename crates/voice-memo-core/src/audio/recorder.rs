//! Capability interface of the recording collaborator.

use crate::CoreResult;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Encoder quality hint passed through to the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    /// Smallest output.
    Min,
    /// Low quality.
    Low,
    /// Medium quality.
    Medium,
    /// High quality.
    High,
    /// Best available.
    #[default]
    Max,
}

/// Output encoding requested from the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    /// Linear PCM in a WAV container.
    Lpcm,
    /// AAC.
    #[default]
    Aac,
    /// Opus.
    Opus,
}

/// Parameters for `prepare_recording_at_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingConfig {
    /// Samples per second.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Encoder quality hint.
    pub quality: AudioQuality,
    /// Output encoding.
    pub encoding: AudioEncoding,
    /// Target bitrate in bits per second, for compressed encodings.
    pub bitrate: u32,
    /// Whether progress events carry metering.
    pub metering_enabled: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            quality: AudioQuality::Max,
            encoding: AudioEncoding::Aac,
            bitrate: 32_000,
            metering_enabled: true,
        }
    }
}

/// How a recorder reports that a take is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionDelivery {
    /// A [`RecorderEvent::Finished`] follows `stop_recording`.
    Event,
    /// The path returned by `stop_recording` is the completion.
    StopResult,
}

/// Completion of one take, whatever way the recorder delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishNotice {
    /// Whether the recorder produced a usable file.
    pub succeeded: bool,
    /// Location of the recorded file.
    pub path: PathBuf,
    /// File size in bytes, when known.
    pub size_bytes: Option<u64>,
}

/// Asynchronous notifications from the recorder.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// Periodic progress while capturing.
    Progress {
        /// Seconds recorded so far in this take.
        current_time: f64,
        /// Input level in the recorder's metering scale.
        current_metering: f32,
    },
    /// The take was finalized.
    Finished(FinishNotice),
}

/// Microphone permission and recording.
///
/// Futures are not `Send`: implementations may hold platform audio streams
/// that must stay on the event loop thread.
#[async_trait(?Send)]
pub trait Recorder {
    /// Asks for microphone access. Called once per session.
    async fn request_authorization(&mut self) -> bool;

    /// Sets the destination and parameters of the next take.
    fn prepare_recording_at_path(
        &mut self,
        path: &Path,
        config: &RecordingConfig,
    ) -> CoreResult<()>;

    /// Starts capturing into the prepared destination.
    async fn start_recording(&mut self) -> CoreResult<()>;

    /// Suspends capture.
    async fn pause_recording(&mut self) -> CoreResult<()>;

    /// Continues a suspended capture.
    async fn resume_recording(&mut self) -> CoreResult<()>;

    /// Ends capture and returns the file location.
    async fn stop_recording(&mut self) -> CoreResult<PathBuf>;

    /// How completion is reported.
    fn completion_delivery(&self) -> CompletionDelivery;

    /// Recorder name for logging.
    fn name(&self) -> &str;
}
