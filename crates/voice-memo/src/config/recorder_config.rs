use crate::config::default_file_name;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use voice_memo_core::{AudioEncoding, AudioQuality, RecordingConfig};

/// Recording destination and capture parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Directory for the take (None = the user's documents directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// File name of the take, overwritten on every recording.
    pub file_name: String,
    /// Samples per second.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Encoder quality hint.
    pub quality: AudioQuality,
    /// Output encoding. The desktop recorder only writes `lpcm`.
    pub encoding: AudioEncoding,
    /// Target bitrate for compressed encodings.
    pub bitrate: u32,
    /// Whether progress events carry metering.
    pub metering_enabled: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        let core = RecordingConfig::default();
        Self {
            directory: None,
            file_name: default_file_name(),
            sample_rate: core.sample_rate,
            channels: core.channels,
            quality: core.quality,
            encoding: AudioEncoding::Lpcm,
            bitrate: core.bitrate,
            metering_enabled: core.metering_enabled,
        }
    }
}

impl From<&RecorderConfig> for RecordingConfig {
    fn from(config: &RecorderConfig) -> Self {
        RecordingConfig {
            sample_rate: config.sample_rate,
            channels: config.channels,
            quality: config.quality,
            encoding: config.encoding,
            bitrate: config.bitrate,
            metering_enabled: config.metering_enabled,
        }
    }
}
