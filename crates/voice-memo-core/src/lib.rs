//! Voice-memo Core Library
//!
//! Recording session state machine and live waveform window, wired to
//! recorder and player collaborators. cpal-backed collaborators are
//! included.
//!
//! # Example
//!
//! ```no_run
//! use voice_memo_core::{
//!     AudioEncoding, ControllerSettings, CpalPlayer, CpalRecorder, RecordingConfig,
//!     SessionController,
//! };
//!
//! # async fn run() {
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(64);
//! // The cpal recorder writes WAV, so ask for linear PCM.
//! let settings = ControllerSettings {
//!     recording: RecordingConfig {
//!         encoding: AudioEncoding::Lpcm,
//!         ..RecordingConfig::default()
//!     },
//!     ..ControllerSettings::default()
//! };
//! let mut controller = SessionController::new(
//!     CpalRecorder::new(events_tx),
//!     CpalPlayer::new(),
//!     settings,
//! );
//!
//! controller.initialize().await;
//! controller.record().await;
//! while let Some(event) = events_rx.recv().await {
//!     controller.handle_event(event);
//!     if controller.view().elapsed_seconds >= 3 {
//!         break;
//!     }
//! }
//! controller.stop().await;
//! controller.play().await;
//! # }
//! ```

mod audio;
mod error;
mod session;
mod waveform;

pub use {
    audio::{
        AudioEncoding, AudioQuality, CompletionDelivery, CpalPlayer, CpalRecorder, FinishNotice,
        Player, Recorder, RecorderEvent, RecordingConfig,
    },
    error::CoreError,
    error::Result as CoreResult,
    session::{
        CommandOutcome, ControllerSettings, FinishedRecording, Permission, Rejection,
        RecordingSession, SessionController, SessionState, SessionView, TransportCommand,
    },
    waveform::{
        AmplitudeMapping, AmplitudeSample, DEFAULT_METERING_OFFSET, MIN_MAGNITUDE,
        WaveformBuffer, WaveformGeometry,
    },
};

#[cfg(test)]
mod tests;
