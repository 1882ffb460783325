use crate::config::default_render_interval_ms;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Terminal status line settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Milliseconds between status line redraws.
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: default_render_interval_ms(),
        }
    }
}

impl DisplayConfig {
    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }
}
