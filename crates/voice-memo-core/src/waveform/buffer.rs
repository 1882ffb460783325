use crate::{session::SessionState, waveform::AmplitudeSample};

use std::collections::VecDeque;

/// Bar layout the visible window is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformGeometry {
    /// Width available for bars.
    pub visible_width: u32,
    /// Width of one bar.
    pub bar_width: u32,
    /// Space between bars.
    pub bar_gap: u32,
}

impl Default for WaveformGeometry {
    fn default() -> Self {
        Self {
            visible_width: 300,
            bar_width: 5,
            bar_gap: 5,
        }
    }
}

impl WaveformGeometry {
    /// Horizontal distance from one bar to the next.
    pub fn pitch(&self) -> u32 {
        self.bar_width.saturating_add(self.bar_gap)
    }

    /// Number of bars that fit, at least one.
    pub fn capacity(&self) -> usize {
        self.visible_width
            .checked_div(self.pitch())
            .map_or(1, |bars| bars.max(1) as usize)
    }
}

/// Sliding window over the most recent bar magnitudes.
///
/// Insertion order is chronological; once `capacity` is reached the oldest
/// bar is evicted for each new one. Capacity never changes after
/// construction.
#[derive(Debug, Clone)]
pub struct WaveformBuffer {
    capacity: usize,
    samples: VecDeque<f32>,
}

impl WaveformBuffer {
    /// Creates an empty window holding at most `capacity` bars (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Creates an empty window sized for `geometry`.
    pub fn from_geometry(geometry: WaveformGeometry) -> Self {
        Self::new(geometry.capacity())
    }

    /// Clears all bars.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Appends `sample` if `state` is live. Returns whether it was kept.
    pub fn observe(&mut self, state: SessionState, sample: AmplitudeSample) -> bool {
        if !state.is_live() {
            return false;
        }

        self.samples.push_back(sample.magnitude);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        true
    }

    /// Ordered copy of the current bars, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    /// Iterates bars oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Maximum number of bars.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of bars.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no bars are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
