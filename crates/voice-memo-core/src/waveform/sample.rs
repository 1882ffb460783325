/// Smallest magnitude a bar can have.
pub const MIN_MAGNITUDE: f32 = 1.0;

/// Metering offset matching a recorder that reports dBFS (0 = full scale).
pub const DEFAULT_METERING_OFFSET: f32 = 65.0;

/// One metering reading mapped to a bar magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeSample {
    /// Seconds since the take started.
    pub timestamp_seconds: f64,
    /// Bar magnitude, never below the floor it was built with.
    pub magnitude: f32,
}

impl AmplitudeSample {
    /// Builds a sample with the magnitude clamped to [`MIN_MAGNITUDE`].
    pub fn new(timestamp_seconds: f64, magnitude: f32) -> Self {
        Self::with_floor(timestamp_seconds, magnitude, MIN_MAGNITUDE)
    }

    /// Builds a sample with the magnitude clamped to `floor`.
    ///
    /// A NaN magnitude collapses to the floor.
    pub fn with_floor(timestamp_seconds: f64, magnitude: f32, floor: f32) -> Self {
        Self {
            timestamp_seconds,
            magnitude: magnitude.max(floor),
        }
    }

    /// Whole seconds represented by the timestamp.
    pub fn whole_seconds(&self) -> u64 {
        if self.timestamp_seconds.is_finite() && self.timestamp_seconds > 0.0 {
            self.timestamp_seconds.floor() as u64
        } else {
            0
        }
    }
}

/// Maps a recorder's metering scale onto bar magnitudes:
/// `max(offset + metering, floor)`.
///
/// The offset is a calibration constant for one recorder's scale; a recorder
/// that meters differently needs a different mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeMapping {
    /// Added to the raw metering value.
    pub offset: f32,
    /// Lower bound of the resulting magnitude.
    pub floor: f32,
}

impl Default for AmplitudeMapping {
    fn default() -> Self {
        Self {
            offset: DEFAULT_METERING_OFFSET,
            floor: MIN_MAGNITUDE,
        }
    }
}

impl AmplitudeMapping {
    /// Converts one progress reading into a sample.
    pub fn sample(&self, current_time: f64, current_metering: f32) -> AmplitudeSample {
        AmplitudeSample::with_floor(current_time, self.offset + current_metering, self.floor)
    }
}
