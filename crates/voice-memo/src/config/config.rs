//! Configuration management for voice-memo.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{DisplayConfig, PlaybackConfig, RecorderConfig, WaveformConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::{ProjectDirs, UserDirs};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use voice_memo_core::ControllerSettings;

/// Main configuration struct. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Recording destination and capture parameters.
    #[serde(default)]
    pub recording: RecorderConfig,
    /// Waveform layout and metering mapping.
    #[serde(default)]
    pub waveform: WaveformConfig,
    /// Playback settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Status line settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config = Self::parse(&contents)?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            Self::create_default()
        }
    }

    /// Parse a TOML document. Missing sections and keys take their defaults.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Reject values the recorder or the event loop cannot work with.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let problem = if self.recording.sample_rate == 0 {
            Some("recording.sample_rate must be greater than zero")
        } else if self.recording.channels == 0 {
            Some("recording.channels must be greater than zero")
        } else if self.recording.file_name.trim().is_empty() {
            Some("recording.file_name must not be empty")
        } else if self.waveform.geometry().pitch() == 0 {
            Some("waveform.bar_width + waveform.bar_gap must be greater than zero")
        } else if !self.waveform.metering_offset.is_finite()
            || !self.waveform.magnitude_floor.is_finite()
        {
            Some("waveform.metering_offset and waveform.magnitude_floor must be finite")
        } else if self.display.render_interval_ms == 0 {
            Some("display.render_interval_ms must be greater than zero")
        } else {
            None
        };

        match problem {
            Some(reason) => Err(AppError::ConfigError {
                reason: reason.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }

    /// Save configuration to disk using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        info!(config_path = ?config_path, "Configuration saved (atomic write)");
        Ok(())
    }

    #[track_caller]
    pub(crate) fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(())
    }

    /// Where takes are written: the configured directory, else the documents
    /// directory, else the application data directory.
    #[track_caller]
    pub fn output_path(&self) -> AppResult<PathBuf> {
        let directory = match &self.recording.directory {
            Some(dir) => dir.clone(),
            None => match UserDirs::new().and_then(|u| u.document_dir().map(Path::to_path_buf)) {
                Some(dir) => dir,
                None => project_dirs()?.data_dir().to_path_buf(),
            },
        };

        Ok(directory.join(&self.recording.file_name))
    }

    /// Controller construction parameters for this configuration.
    #[track_caller]
    pub fn controller_settings(&self) -> AppResult<ControllerSettings> {
        Ok(ControllerSettings {
            output_path: self.output_path()?,
            recording: (&self.recording).into(),
            geometry: self.waveform.geometry(),
            mapping: self.waveform.mapping(),
            settle_delay: self.playback.settle_delay(),
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let config = Config::default();
        config.save()?;
        Ok(config)
    }
}

/// Platform directories for voice-memo.
#[track_caller]
pub(crate) fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "voice-memo", "Voice-Memo").ok_or_else(|| AppError::ConfigError {
        reason: "Failed to get project directories".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}
