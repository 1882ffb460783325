mod buffer;
mod sample;

pub use {
    buffer::{WaveformBuffer, WaveformGeometry},
    sample::{AmplitudeMapping, AmplitudeSample, DEFAULT_METERING_OFFSET, MIN_MAGNITUDE},
};
