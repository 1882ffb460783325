/// Metering reported for silence, in dBFS.
pub(crate) const METERING_FLOOR_DB: f32 = -160.0;

/// Interval between progress events.
pub(crate) const PROGRESS_INTERVAL_MS: u64 = 100;

/// RMS level in dBFS of `count` samples whose squares sum to `sum_sq`,
/// floored at [`METERING_FLOOR_DB`].
pub(crate) fn level_dbfs(sum_sq: f64, count: u64) -> f32 {
    if count == 0 {
        return METERING_FLOOR_DB;
    }
    let rms = (sum_sq / count as f64).sqrt();
    if rms <= 0.0 {
        return METERING_FLOOR_DB;
    }
    ((20.0 * rms.log10()) as f32).max(METERING_FLOOR_DB)
}

/// One progress reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MeterReading {
    pub current_time: f64,
    pub current_metering: f32,
}

/// Turns interleaved capture callbacks into periodic progress readings.
///
/// Owned by the capture callback; time only counts frames that were fed in,
/// so paused periods do not advance it.
#[derive(Debug)]
pub(crate) struct MeterAccumulator {
    channels: u64,
    sample_rate: u32,
    block_frames: u64,
    frames_total: u64,
    frames_in_block: u64,
    sum_sq: f64,
    count: u64,
}

impl MeterAccumulator {
    pub fn new(sample_rate: u32, channels: u16, interval_ms: u64) -> Self {
        let block_frames = (u64::from(sample_rate) * interval_ms / 1000).max(1);
        Self {
            channels: u64::from(channels.max(1)),
            sample_rate: sample_rate.max(1),
            block_frames,
            frames_total: 0,
            frames_in_block: 0,
            sum_sq: 0.0,
            count: 0,
        }
    }

    /// Feeds one interleaved buffer. Returns the latest completed reading,
    /// if a block boundary was crossed.
    pub fn push(&mut self, data: &[f32]) -> Option<MeterReading> {
        let mut reading = None;

        for frame in data.chunks(self.channels as usize) {
            for &s in frame {
                self.sum_sq += f64::from(s) * f64::from(s);
                self.count += 1;
            }
            self.frames_total += 1;
            self.frames_in_block += 1;

            if self.frames_in_block >= self.block_frames {
                reading = Some(MeterReading {
                    current_time: self.elapsed_seconds(),
                    current_metering: level_dbfs(self.sum_sq, self.count),
                });
                self.frames_in_block = 0;
                self.sum_sq = 0.0;
                self.count = 0;
            }
        }

        reading
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.frames_total as f64 / f64::from(self.sample_rate)
    }
}
