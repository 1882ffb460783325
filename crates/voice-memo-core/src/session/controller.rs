//! Transport control for the recorder screen.
//!
//! The controller owns the session and the waveform window and is driven
//! from a single event loop: commands, progress readings and completions are
//! handled one at a time. `record` and `stop` update state before the
//! recorder answers; `pause` and `resume` wait for confirmation. Guard
//! violations and collaborator failures are logged and reported through
//! [`CommandOutcome`], never propagated.

use crate::{
    CoreError,
    audio::{CompletionDelivery, FinishNotice, Player, Recorder, RecorderEvent, RecordingConfig},
    session::{
        FinishedRecording, Permission, Rejection, RecordingSession, SessionState, SessionView,
        TransportCommand,
    },
    waveform::{AmplitudeMapping, AmplitudeSample, WaveformBuffer, WaveformGeometry},
};

use std::{panic::Location, path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Result of a transport command.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command took effect.
    Applied,
    /// The command was not legal in the current state; nothing changed.
    Rejected(Rejection),
    /// The collaborator failed. Optimistic state changes are kept.
    Failed(CoreError),
}

impl CommandOutcome {
    /// Whether the command took effect.
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Construction parameters for [`SessionController`].
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Destination of every take.
    pub output_path: PathBuf,
    /// Parameters passed when preparing the recorder.
    pub recording: RecordingConfig,
    /// Bar layout; fixes the waveform capacity.
    pub geometry: WaveformGeometry,
    /// Metering to magnitude mapping.
    pub mapping: AmplitudeMapping,
    /// Pause between a confirmed load and play. Zero when the player signals
    /// readiness reliably.
    pub settle_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("recording.wav"),
            recording: RecordingConfig::default(),
            geometry: WaveformGeometry::default(),
            mapping: AmplitudeMapping::default(),
            settle_delay: Duration::ZERO,
        }
    }
}

/// Recording lifecycle state machine wired to its collaborators.
pub struct SessionController<R, P> {
    recorder: R,
    player: P,
    session: RecordingSession,
    waveform: WaveformBuffer,
    recording: RecordingConfig,
    mapping: AmplitudeMapping,
    settle_delay: Duration,
}

impl<R: Recorder, P: Player> SessionController<R, P> {
    /// Creates a controller in `Idle` with unresolved permission.
    pub fn new(recorder: R, player: P, settings: ControllerSettings) -> Self {
        Self {
            recorder,
            player,
            session: RecordingSession::new(settings.output_path),
            waveform: WaveformBuffer::from_geometry(settings.geometry),
            recording: settings.recording,
            mapping: settings.mapping,
            settle_delay: settings.settle_delay,
        }
    }

    /// Resolves microphone permission and, if granted, prepares the output.
    ///
    /// Call once per mount.
    #[instrument(skip(self), fields(recorder = self.recorder.name()))]
    pub async fn initialize(&mut self) -> Permission {
        let permission = Permission::from(self.recorder.request_authorization().await);
        self.session.set_permission(permission);

        if permission.is_granted() {
            self.prepare_output();
        } else {
            warn!("Microphone permission denied");
        }

        info!(?permission, "Session initialized");
        permission
    }

    /// Starts a new take.
    #[instrument(skip(self))]
    pub async fn record(&mut self) -> CommandOutcome {
        if let Err(rejection) = self.check(TransportCommand::Record) {
            return CommandOutcome::Rejected(rejection);
        }

        if self.session.needs_prepare() {
            self.prepare_output();
        }

        let take_id = self.session.begin_take();
        self.waveform.reset();

        match self.recorder.start_recording().await {
            Ok(()) => {
                info!(take_id = %take_id, "Recording started");
                CommandOutcome::Applied
            }
            Err(e) => {
                error!(take_id = %take_id, error = %e, "Failed to start recording");
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Suspends the current take.
    #[instrument(skip(self))]
    pub async fn pause(&mut self) -> CommandOutcome {
        let next = match self.check(TransportCommand::Pause) {
            Ok(next) => next,
            Err(rejection) => return CommandOutcome::Rejected(rejection),
        };

        match self.recorder.pause_recording().await {
            Ok(()) => {
                self.session.set_state(next);
                info!(take_id = ?self.session.take_id(), "Recording paused");
                CommandOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Failed to pause recording");
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Continues a paused take.
    #[instrument(skip(self))]
    pub async fn resume(&mut self) -> CommandOutcome {
        let next = match self.check(TransportCommand::Resume) {
            Ok(next) => next,
            Err(rejection) => return CommandOutcome::Rejected(rejection),
        };

        match self.recorder.resume_recording().await {
            Ok(()) => {
                self.session.set_state(next);
                info!(take_id = ?self.session.take_id(), "Recording resumed");
                CommandOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Failed to resume recording");
                CommandOutcome::Failed(e)
            }
        }
    }

    /// The combined pause/resume control: resumes when paused, pauses
    /// otherwise.
    pub async fn toggle_pause(&mut self) -> CommandOutcome {
        if self.session.state() == SessionState::Paused {
            self.resume().await
        } else {
            self.pause().await
        }
    }

    /// Ends the current take.
    ///
    /// The session is `Stopped` before the recorder confirms. Recorders that
    /// complete through the stop result are finished here.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> CommandOutcome {
        if let Err(rejection) = self.check(TransportCommand::Stop) {
            return CommandOutcome::Rejected(rejection);
        }

        self.session.mark_stopped();
        let duration_seconds = self.session.elapsed_seconds();

        match self.recorder.stop_recording().await {
            Ok(path) => {
                info!(
                    take_id = ?self.session.take_id(),
                    duration_seconds,
                    path = ?path,
                    "Recording stopped"
                );
                if self.recorder.completion_delivery() == CompletionDelivery::StopResult {
                    let _ = self.finish(FinishNotice {
                        succeeded: true,
                        path,
                        size_bytes: None,
                    });
                }
                CommandOutcome::Applied
            }
            Err(e) => {
                error!(error = %e, "Failed to stop recording");
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Plays the current output, stopping an active take first.
    ///
    /// Load and play run as two sequential steps; play is only issued once
    /// the load has resolved.
    #[instrument(skip(self), fields(player = self.player.name()))]
    pub async fn play(&mut self) -> CommandOutcome {
        if self.session.state().is_active() {
            let _ = self.stop().await;
        }

        let path = self.session.output_path().to_path_buf();

        if let Err(e) = self.player.load(&path).await {
            error!(path = ?path, error = %e, "failed to load the sound");
            return CommandOutcome::Failed(e);
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        match self.player.play().await {
            Ok(true) => {
                info!(path = ?path, "successfully finished playing");
                CommandOutcome::Applied
            }
            Ok(false) => {
                warn!(path = ?path, "playback failed due to audio decoding errors");
                CommandOutcome::Failed(CoreError::PlaybackFailed {
                    path,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Err(e) => {
                error!(path = ?path, error = %e, "Playback failed");
                CommandOutcome::Failed(e)
            }
        }
    }

    /// Completion of a take, however the recorder delivered it.
    ///
    /// The metadata is always kept, even from a superseded take; the state
    /// only moves when a stopped take was waiting for it.
    #[instrument(skip(self))]
    pub fn finish(&mut self, notice: FinishNotice) -> CommandOutcome {
        info!(
            "Finished recording of duration {} seconds at path: {} and size of {} bytes",
            self.session.elapsed_seconds(),
            notice.path.display(),
            notice.size_bytes.unwrap_or(0)
        );

        let command = TransportCommand::Finish {
            succeeded: notice.succeeded,
        };
        let next = self
            .session
            .state()
            .apply(command, self.session.permission());

        self.session.record_finish(FinishedRecording {
            succeeded: notice.succeeded,
            path: notice.path,
            size_bytes: notice.size_bytes,
        });

        match next {
            Ok(state) => {
                self.session.set_state(state);
                CommandOutcome::Applied
            }
            Err(rejection) => {
                debug!(state = ?self.session.state(), %rejection, "Late completion");
                CommandOutcome::Rejected(rejection)
            }
        }
    }

    /// One metering reading from the recorder.
    pub fn on_progress(&mut self, current_time: f64, current_metering: f32) -> bool {
        let sample = self.mapping.sample(current_time, current_metering);
        self.observe(sample)
    }

    /// Feeds a sample to the waveform. Returns whether it was live.
    pub fn observe(&mut self, sample: AmplitudeSample) -> bool {
        let live = self.waveform.observe(self.session.state(), sample);
        if live {
            self.session.advance_elapsed(sample.whole_seconds());
        }
        live
    }

    /// Dispatches a recorder notification.
    pub fn handle_event(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Progress {
                current_time,
                current_metering,
            } => {
                self.on_progress(current_time, current_metering);
            }
            RecorderEvent::Finished(notice) => {
                let _ = self.finish(notice);
            }
        }
    }

    /// Read-only projection for rendering.
    pub fn view(&self) -> SessionView {
        SessionView::of(&self.session, &self.waveform)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// The session.
    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// The waveform window.
    pub fn waveform(&self) -> &WaveformBuffer {
        &self.waveform
    }

    /// The recording collaborator.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// The playback collaborator.
    pub fn player(&self) -> &P {
        &self.player
    }

    fn check(&self, command: TransportCommand) -> Result<SessionState, Rejection> {
        let state = self.session.state();
        state
            .apply(command, self.session.permission())
            .inspect_err(|rejection| warn!(?state, ?command, "{}", rejection))
    }

    fn prepare_output(&mut self) {
        let path = self.session.output_path().to_path_buf();
        match self
            .recorder
            .prepare_recording_at_path(&path, &self.recording)
        {
            Ok(()) => debug!(path = ?path, "Output prepared"),
            Err(e) => error!(path = ?path, error = %e, "Failed to prepare output"),
        }
    }
}
