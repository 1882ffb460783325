use serde::{Deserialize, Serialize};
use voice_memo_core::{AmplitudeMapping, WaveformGeometry};

/// Bar layout and metering mapping of the live waveform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Width of the waveform area in points.
    pub visible_width: u32,
    /// Width of one bar.
    pub bar_width: u32,
    /// Gap after each bar.
    pub bar_gap: u32,
    /// Added to the recorder's metering to get a magnitude.
    pub metering_offset: f32,
    /// Smallest magnitude drawn.
    pub magnitude_floor: f32,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        let geometry = WaveformGeometry::default();
        let mapping = AmplitudeMapping::default();
        Self {
            visible_width: geometry.visible_width,
            bar_width: geometry.bar_width,
            bar_gap: geometry.bar_gap,
            metering_offset: mapping.offset,
            magnitude_floor: mapping.floor,
        }
    }
}

impl WaveformConfig {
    pub fn geometry(&self) -> WaveformGeometry {
        WaveformGeometry {
            visible_width: self.visible_width,
            bar_width: self.bar_width,
            bar_gap: self.bar_gap,
        }
    }

    pub fn mapping(&self) -> AmplitudeMapping {
        AmplitudeMapping {
            offset: self.metering_offset,
            floor: self.magnitude_floor,
        }
    }
}
