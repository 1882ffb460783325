use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Converts a whole interleaved sound from one sample rate to another.
///
/// The resampler's output delay is trimmed, so the result lines up with the
/// input and has `frames * output_rate / input_rate` frames.
pub(crate) struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> CoreResult<Self> {
        let channels = usize::from(channels.max(1));

        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            channels,
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, channels, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels,
        })
    }

    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let frames = samples.len() / self.channels;
        let estimated_frames = (frames as f64 * f64::from(self.output_rate)
            / f64::from(self.input_rate)) as usize;
        let delay = self.resampler.output_delay();
        let wanted = (delay + estimated_frames) * self.channels;
        let chunk_len = CHUNK_FRAMES * self.channels;
        // Zero chunks after the input flush the delayed tail out.
        let flush_limit = samples.len() + chunk_len * (delay / CHUNK_FRAMES + 2);

        let mut output = Vec::with_capacity(wanted);
        let mut offset = 0;

        while output.len() < wanted && offset < flush_limit {
            let start = offset.min(samples.len());
            let end = (offset + chunk_len).min(samples.len());
            let mut input_chunk = samples[start..end].to_vec();
            input_chunk.resize(chunk_len, 0.0);
            offset += chunk_len;

            let input_adapter = InterleavedSlice::new(&input_chunk, self.channels, CHUNK_FRAMES)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Failed to create input adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let output_frames = self.resampler.output_frames_max();
            let mut output_chunk = vec![0.0f32; output_frames * self.channels];

            let mut output_adapter =
                InterleavedSlice::new_mut(&mut output_chunk, self.channels, output_frames)
                    .map_err(|e| CoreError::ResamplingError {
                        reason: format!("Failed to create output adapter: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

            let (_input_frames, output_frames_written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&output_chunk[..output_frames_written * self.channels]);
        }

        output.drain(..(delay * self.channels).min(output.len()));
        output.truncate(estimated_frames * self.channels);

        debug!(
            input_frames = frames,
            output_frames = output.len() / self.channels,
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            delay,
            "Resampled audio"
        );

        Ok(output)
    }
}
