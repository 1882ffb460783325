pub(crate) mod capture;
pub(crate) mod metering;
pub(crate) mod playback;
mod player;
mod recorder;
pub(crate) mod resampler;

pub use {
    capture::CpalRecorder,
    playback::CpalPlayer,
    player::Player,
    recorder::{
        AudioEncoding, AudioQuality, CompletionDelivery, FinishNotice, Recorder, RecorderEvent,
        RecordingConfig,
    },
};
