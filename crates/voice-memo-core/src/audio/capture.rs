use crate::{
    CoreError, CoreResult,
    audio::{
        AudioEncoding, CompletionDelivery, FinishNotice, Recorder, RecorderEvent,
        RecordingConfig,
        metering::{METERING_FLOOR_DB, MeterAccumulator, PROGRESS_INTERVAL_MS},
    },
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Device, SampleFormat, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, instrument, warn};

/// Maximum samples buffered per take (10 minutes at 48kHz stereo).
///
/// Capture stops accumulating past this point; metering keeps running.
pub(crate) const MAX_TAKE_SAMPLES: usize = 48_000 * 2 * 60 * 10;

/// Time given to an in-flight callback to observe the shutdown flag after
/// the stream is dropped.
const STREAM_DRAIN_DELAY: Duration = Duration::from_millis(5);

struct PreparedTake {
    path: PathBuf,
    config: StreamConfig,
    metering_enabled: bool,
}

/// Microphone recorder on the default cpal input device.
///
/// Captured samples are buffered in memory and written as 16-bit WAV when
/// the take stops. Progress and completion are delivered on the event
/// channel given at construction.
pub struct CpalRecorder {
    events: mpsc::Sender<RecorderEvent>,
    device: Option<Device>,
    prepared: Option<PreparedTake>,
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    paused: Arc<AtomicBool>,
    /// Signals the capture callback to stop writing. Set before the stream
    /// is dropped so no late callback touches the next take's buffer.
    shutdown: Arc<AtomicBool>,
}

impl CpalRecorder {
    /// Creates a recorder that reports on `events`. No device is opened
    /// until authorization is requested.
    pub fn new(events: mpsc::Sender<RecorderEvent>) -> Self {
        Self {
            events,
            device: None,
            prepared: None,
            stream: None,
            samples: Arc::new(Mutex::new(Vec::new())),
            paused: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    #[track_caller]
    fn input_device(&mut self) -> CoreResult<Device> {
        if let Some(device) = &self.device {
            return Ok(device.clone());
        }

        let device =
            cpal::default_host()
                .default_input_device()
                .ok_or(CoreError::NoMicrophoneFound {
                    location: ErrorLocation::from(Location::caller()),
                })?;
        self.device = Some(device.clone());
        Ok(device)
    }

    /// Delivers the completion without waiting on the event loop, which may
    /// be the caller of `stop_recording`.
    fn notify(&self, notice: FinishNotice) {
        match self.events.try_send(RecorderEvent::Finished(notice)) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let events = self.events.clone();
                tokio::spawn(async move {
                    if events.send(event).await.is_err() {
                        warn!("Completion could not be delivered, event loop gone");
                    }
                });
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Completion could not be delivered, event loop gone");
            }
        }
    }
}

#[async_trait(?Send)]
impl Recorder for CpalRecorder {
    #[instrument(skip(self))]
    async fn request_authorization(&mut self) -> bool {
        // Desktop hosts have no permission prompt; an input device is the grant.
        match self.input_device() {
            Ok(device) => {
                info!(device_id = ?device.id(), "Input device available");
                true
            }
            Err(e) => {
                warn!(error = %e, "No input device, recording unavailable");
                false
            }
        }
    }

    #[track_caller]
    #[instrument(skip(self, config))]
    fn prepare_recording_at_path(
        &mut self,
        path: &Path,
        config: &RecordingConfig,
    ) -> CoreResult<()> {
        if config.encoding != AudioEncoding::Lpcm {
            return Err(CoreError::UnsupportedEncoding {
                encoding: config.encoding,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let device = self.input_device()?;
        let stream_config = select_input_config(&device, config)?;

        debug!(
            sample_rate = stream_config.sample_rate,
            channels = stream_config.channels,
            quality = ?config.quality,
            "Recording prepared (bitrate ignored for LPCM)"
        );

        self.prepared = Some(PreparedTake {
            path: path.to_path_buf(),
            config: stream_config,
            metering_enabled: config.metering_enabled,
        });

        Ok(())
    }

    #[instrument(skip(self))]
    async fn start_recording(&mut self) -> CoreResult<()> {
        let device = self.input_device()?;
        let prepared = self.prepared.as_ref().ok_or(CoreError::NotPrepared {
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Drop any stream left from an abandoned take.
        self.shutdown.store(true, Ordering::Release);
        self.stream = None;

        self.samples
            .lock()
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        self.paused.store(false, Ordering::Release);
        self.shutdown.store(false, Ordering::Release);

        let samples = Arc::clone(&self.samples);
        let paused = Arc::clone(&self.paused);
        let shutdown = Arc::clone(&self.shutdown);
        let events = self.events.clone();
        let metering_enabled = prepared.metering_enabled;
        let mut meter = MeterAccumulator::new(
            prepared.config.sample_rate,
            prepared.config.channels,
            PROGRESS_INTERVAL_MS,
        );

        let stream = device
            .build_input_stream(
                &prepared.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                        return;
                    }

                    {
                        let mut buf = samples.lock().unwrap_or_else(|e| {
                            error!("Sample buffer lock poisoned, recovering: {}", e);
                            e.into_inner()
                        });
                        let room = MAX_TAKE_SAMPLES.saturating_sub(buf.len());
                        buf.extend(data.iter().take(room).copied());
                    }

                    if let Some(reading) = meter.push(data) {
                        let current_metering = if metering_enabled {
                            reading.current_metering
                        } else {
                            METERING_FLOOR_DB
                        };
                        // A full channel means the loop is behind; the next reading supersedes this one.
                        let _ = events.try_send(RecorderEvent::Progress {
                            current_time: reading.current_time,
                            current_metering,
                        });
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CoreError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?prepared.path, "Audio capture started");
        self.stream = Some(stream);

        Ok(())
    }

    #[instrument(skip(self))]
    async fn pause_recording(&mut self) -> CoreResult<()> {
        let stream = self.stream.as_ref().ok_or(CoreError::NotRecording {
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.paused.store(true, Ordering::Release);
        if let Err(e) = stream.pause() {
            // The paused flag already drops samples.
            debug!(error = %e, "Backend cannot pause stream");
        }

        info!("Audio capture paused");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resume_recording(&mut self) -> CoreResult<()> {
        let stream = self.stream.as_ref().ok_or(CoreError::NotRecording {
            location: ErrorLocation::from(Location::caller()),
        })?;

        stream.play().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to resume stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        self.paused.store(false, Ordering::Release);

        info!("Audio capture resumed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop_recording(&mut self) -> CoreResult<PathBuf> {
        self.shutdown.store(true, Ordering::Release);

        let stream = self.stream.take().ok_or(CoreError::NotRecording {
            location: ErrorLocation::from(Location::caller()),
        })?;
        drop(stream);
        tokio::time::sleep(STREAM_DRAIN_DELAY).await;

        let prepared = self.prepared.as_ref().ok_or(CoreError::NotPrepared {
            location: ErrorLocation::from(Location::caller()),
        })?;
        let path = prepared.path.clone();
        let spec = hound::WavSpec {
            channels: prepared.config.channels,
            sample_rate: prepared.config.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let samples = std::mem::take(&mut *self.samples.lock().map_err(|e| {
            CoreError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?);
        debug!(sample_count = samples.len(), "Captured audio samples");

        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || write_wav(&target, spec, &samples))
            .await
            .unwrap_or_else(|e| {
                Err(CoreError::DeviceError {
                    reason: format!("WAV writer task failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })
            });

        match written {
            Ok(size_bytes) => {
                info!(path = ?path, size_bytes, "Audio capture stopped");
                self.notify(FinishNotice {
                    succeeded: true,
                    path: path.clone(),
                    size_bytes: Some(size_bytes),
                });
                Ok(path)
            }
            Err(e) => {
                self.notify(FinishNotice {
                    succeeded: false,
                    path,
                    size_bytes: None,
                });
                Err(e)
            }
        }
    }

    fn completion_delivery(&self) -> CompletionDelivery {
        CompletionDelivery::Event
    }

    fn name(&self) -> &str {
        "cpal"
    }
}

/// Picks an f32 input configuration matching the requested rate and channel
/// count, falling back to the device default.
#[track_caller]
fn select_input_config(device: &Device, config: &RecordingConfig) -> CoreResult<StreamConfig> {
    let matching = device
        .supported_input_configs()
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to query input configs: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?
        .filter(|range| {
            range.channels() == config.channels && range.sample_format() == SampleFormat::F32
        })
        .find(|range| {
            range.min_sample_rate() <= config.sample_rate
                && config.sample_rate <= range.max_sample_rate()
        });

    if let Some(range) = matching {
        return Ok(range.with_sample_rate(config.sample_rate).into());
    }

    let fallback = device
        .default_input_config()
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to get config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    warn!(
        requested_rate = config.sample_rate,
        requested_channels = config.channels,
        sample_rate = fallback.sample_rate(),
        channels = fallback.channels(),
        "Requested input format unsupported, using device default"
    );

    Ok(fallback.into())
}

/// Writes interleaved f32 samples as 16-bit PCM. Returns the file size.
pub(crate) fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[f32]) -> CoreResult<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample))?;
    }
    writer.finalize()?;

    Ok(std::fs::metadata(path)?.len())
}

pub(crate) fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
