mod display_config;
mod playback_config;
#[allow(clippy::module_inception)]
mod config;
mod recorder_config;
mod waveform_config;

pub(crate) use {
    config::{Config, project_dirs},
    display_config::DisplayConfig,
    playback_config::PlaybackConfig,
    recorder_config::RecorderConfig,
    waveform_config::WaveformConfig,
};

pub(crate) const DEFAULT_FILE_NAME: &str = "recording.wav";
pub(crate) const DEFAULT_RENDER_INTERVAL_MS: u64 = 100;

pub(crate) fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

pub(crate) fn default_render_interval_ms() -> u64 {
    DEFAULT_RENDER_INTERVAL_MS
}
