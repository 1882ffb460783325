use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Playback settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Pause between a confirmed load and play, in milliseconds.
    #[serde(default)]
    pub settle_delay_ms: u64,
}

impl PlaybackConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
