use crate::{
    CoreError, CoreResult,
    audio::{Player, resampler::Resampler},
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument};

/// Lets the device play out its last buffer before the stream is dropped.
const PLAYBACK_TAIL: Duration = Duration::from_millis(100);

/// A WAV file decoded into interleaved f32 samples.
#[derive(Debug, Clone)]
pub(crate) struct LoadedSound {
    pub path: PathBuf,
    pub samples: Arc<Vec<f32>>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl LoadedSound {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }
}

/// Walks a loaded sound in the output device's channel layout.
///
/// The sound must already be at the device rate. Channel counts that
/// differ are mixed to mono and spread over every output channel.
pub(crate) struct PlaybackCursor {
    samples: Arc<Vec<f32>>,
    channels: usize,
    frames: usize,
    position: usize,
}

impl PlaybackCursor {
    pub fn new(sound: &LoadedSound) -> Self {
        Self {
            samples: Arc::clone(&sound.samples),
            channels: usize::from(sound.channels.max(1)),
            frames: sound.frames(),
            position: 0,
        }
    }

    /// Fills one interleaved output buffer, padding with silence past the
    /// end. Returns `false` once the sound is exhausted.
    pub fn fill(&mut self, out: &mut [f32], out_channels: usize) -> bool {
        for frame in out.chunks_mut(out_channels.max(1)) {
            if self.position >= self.frames {
                frame.fill(0.0);
                continue;
            }

            let start = self.position * self.channels;
            let source = &self.samples[start..start + self.channels];
            if source.len() == frame.len() {
                frame.copy_from_slice(source);
            } else {
                let mono = source.iter().sum::<f32>() / source.len() as f32;
                frame.fill(mono);
            }
            self.position += 1;
        }

        self.position < self.frames
    }
}

/// Converts `sound` to `output_rate`; a sound already at that rate is
/// returned unchanged.
#[track_caller]
pub(crate) fn resample_to(sound: LoadedSound, output_rate: u32) -> CoreResult<LoadedSound> {
    if sound.sample_rate == output_rate {
        return Ok(sound);
    }

    let mut resampler = Resampler::new(sound.sample_rate, output_rate, sound.channels)?;
    let samples = resampler.resample(&sound.samples)?;

    Ok(LoadedSound {
        samples: Arc::new(samples),
        sample_rate: output_rate,
        ..sound
    })
}

/// Plays WAV files on the default cpal output device.
///
/// Only one stream exists at a time: loading or playing replaces the
/// previous stream, so playbacks never overlap.
#[derive(Default)]
pub struct CpalPlayer {
    sound: Option<LoadedSound>,
    stream: Option<Stream>,
}

impl CpalPlayer {
    /// Creates a player with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl Player for CpalPlayer {
    #[instrument(skip(self))]
    async fn load(&mut self, path: &Path) -> CoreResult<()> {
        self.stream = None;
        self.sound = None;

        let target = path.to_path_buf();
        let sound = tokio::task::spawn_blocking(move || read_wav(&target))
            .await
            .unwrap_or_else(|e| {
                Err(CoreError::DeviceError {
                    reason: format!("WAV reader task failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })
            })?;

        debug!(
            frames = sound.frames(),
            channels = sound.channels,
            sample_rate = sound.sample_rate,
            "Sound loaded"
        );
        self.sound = Some(sound);

        Ok(())
    }

    #[instrument(skip(self))]
    async fn play(&mut self) -> CoreResult<bool> {
        let sound = self.sound.clone().ok_or(CoreError::SoundNotLoaded {
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Previous playback ends here.
        self.stream = None;

        let device = cpal::default_host()
            .default_output_device()
            .ok_or(CoreError::NoOutputDevice {
                location: ErrorLocation::from(Location::caller()),
            })?;
        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let output_rate = config.sample_rate;
        let sound = tokio::task::spawn_blocking(move || resample_to(sound, output_rate))
            .await
            .unwrap_or_else(|e| {
                Err(CoreError::ResamplingError {
                    reason: format!("Resampler task failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })
            })?;

        let out_channels = usize::from(config.channels);
        let mut cursor = PlaybackCursor::new(&sound);
        let (done_tx, done_rx) = oneshot::channel();
        let done = Arc::new(Mutex::new(Some(done_tx)));
        let done_on_error = Arc::clone(&done);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !cursor.fill(data, out_channels) {
                        signal_done(&done, true);
                    }
                },
                move |err| {
                    error!("Audio output stream error: {}", err);
                    signal_done(&done_on_error, false);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        self.stream = Some(stream);

        info!(path = ?sound.path, "Playback started");

        let played = done_rx.await.unwrap_or(false);
        tokio::time::sleep(PLAYBACK_TAIL).await;
        self.stream = None;

        Ok(played)
    }

    fn name(&self) -> &str {
        "cpal"
    }
}

fn signal_done(done: &Mutex<Option<oneshot::Sender<bool>>>, played: bool) {
    let mut slot = done.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(tx) = slot.take() {
        let _ = tx.send(played);
    }
}

/// Decodes a WAV file into interleaved f32 samples in `[-1, 1]`.
#[track_caller]
pub(crate) fn read_wav(path: &Path) -> CoreResult<LoadedSound> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(CoreError::DeviceError {
            reason: format!("WAV file has no channels: {:?}", path),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << spec.bits_per_sample.saturating_sub(1).min(31)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, hound::Error>>()?
        }
    };

    Ok(LoadedSound {
        path: path.to_path_buf(),
        samples: Arc::new(samples),
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}
