use crate::{AppCommand, AppError, AppEvent, AppResult, config::Config, status_line::render_status};

use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::mpsc,
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, instrument, warn};
use voice_memo_core::{
    CommandOutcome, CpalPlayer, CpalRecorder, Player, Recorder, RecorderEvent, SessionController,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notice shown while playback holds the loop.
pub(crate) const PLAYING_NOTICE: &str = "playing";

/// Terminal front end around one recording session.
///
/// Runs a single loop: terminal commands, recorder notifications and render
/// ticks are handled one at a time, so the controller is never shared.
pub struct App<R, P> {
    pub(crate) controller: SessionController<R, P>,
    pub(crate) events_rx: mpsc::Receiver<AppEvent>,
    pub(crate) render_interval: Duration,
    pub(crate) full_scale: f32,
    pub(crate) notice: Option<String>,
}

impl App<CpalRecorder, CpalPlayer> {
    /// Wire the cpal collaborators and spawn the input forwarders.
    ///
    /// Must be called from within the runtime.
    #[track_caller]
    pub(crate) fn new(config: &Config) -> AppResult<Self> {
        let settings = config.controller_settings()?;
        info!(output_path = ?settings.output_path, "Output configured");

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (recorder_tx, recorder_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(forward_recorder_events(recorder_rx, events_tx.clone()));
        tokio::spawn(read_terminal_commands(events_tx));

        let controller =
            SessionController::new(CpalRecorder::new(recorder_tx), CpalPlayer::new(), settings);

        Ok(App::with_controller(controller, events_rx, config))
    }
}

impl<R: Recorder, P: Player> App<R, P> {
    /// An app around an existing controller, reading `events_rx`.
    pub(crate) fn with_controller(
        controller: SessionController<R, P>,
        events_rx: mpsc::Receiver<AppEvent>,
        config: &Config,
    ) -> Self {
        App {
            controller,
            events_rx,
            render_interval: config.display.render_interval(),
            full_scale: config.waveform.metering_offset,
            notice: None,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice-Memo starting");

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("{}\n", AppCommand::HELP).as_bytes())
            .await?;

        self.controller.initialize().await;

        let mut render = tokio::time::interval(self.render_interval);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    match event {
                        AppEvent::Command(AppCommand::Quit) => {
                            info!("Shutdown requested");
                            break;
                        }
                        AppEvent::Command(AppCommand::Play) => {
                            self.announce_playback();
                            self.draw(&mut stdout).await?;

                            // Playback holds the loop until it ends; Ctrl-C still exits.
                            // Other commands always run to completion.
                            tokio::select! {
                                () = self.handle_command(AppCommand::Play) => {}
                                _ = tokio::signal::ctrl_c() => {
                                    info!("Playback interrupted");
                                    break;
                                }
                            }
                            self.draw(&mut stdout).await?;
                        }
                        event => {
                            self.handle_event(event).await;
                            self.draw(&mut stdout).await?;
                        }
                    }
                }

                _ = render.tick() => {
                    self.draw(&mut stdout).await?;
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl-C received");
                    break;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.finish_active_take().await;

        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        info!("Voice-Memo shut down successfully");

        Ok(())
    }

    /// Apply one event other than quit.
    pub(crate) async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Recorder(event) => self.controller.handle_event(event),
            AppEvent::UnknownInput { input } => {
                self.notice = Some(format!("unknown command {:?}", input));
            }
            AppEvent::Command(AppCommand::Quit) => {}
            AppEvent::Command(command) => self.handle_command(command).await,
        }
    }

    /// Execute one transport command and update the notice.
    ///
    /// Rejections show their warning text, failures show which command
    /// failed, and an applied command clears the notice.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, command: AppCommand) {
        let outcome = match command {
            AppCommand::Record => self.controller.record().await,
            AppCommand::TogglePause => self.controller.toggle_pause().await,
            AppCommand::Stop => self.controller.stop().await,
            AppCommand::Play => self.controller.play().await,
            AppCommand::Quit => return,
        };

        match outcome {
            CommandOutcome::Applied => self.notice = None,
            CommandOutcome::Rejected(rejection) => self.notice = Some(rejection.to_string()),
            CommandOutcome::Failed(e) => {
                let e = AppError::from(e);
                error!(?command, error = ?e, "Command failed");
                self.notice = Some(format!("{:?} failed", command));
            }
        }
    }

    /// Shows the playing notice before playback takes over the loop.
    pub(crate) fn announce_playback(&mut self) {
        self.notice = Some(PLAYING_NOTICE.to_string());
    }

    /// Stops a recording or paused take so its file is written.
    pub(crate) async fn finish_active_take(&mut self) {
        if self.controller.state().is_active() {
            info!("Stopping active take before exit");
            let _ = self.controller.stop().await;
        }
    }

    /// Current notice, if any.
    pub(crate) fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    async fn draw(&self, stdout: &mut tokio::io::Stdout) -> AppResult<()> {
        let line = render_status(&self.controller.view(), self.full_scale, self.notice());
        // Carriage return and erase-to-end keep redraws on one line.
        stdout
            .write_all(format!("\r{}\x1b[K", line).as_bytes())
            .await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Moves recorder notifications onto the application channel.
async fn forward_recorder_events(
    mut recorder_rx: mpsc::Receiver<RecorderEvent>,
    events_tx: mpsc::Sender<AppEvent>,
) {
    while let Some(event) = recorder_rx.recv().await {
        if events_tx.send(AppEvent::Recorder(event)).await.is_err() {
            break;
        }
    }
    debug!("Recorder event forwarder stopped");
}

/// Parses terminal lines into commands. End of input quits.
async fn read_terminal_commands(events_tx: mpsc::Sender<AppEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => parse_line(&line),
            Ok(None) => AppEvent::Command(AppCommand::Quit),
            Err(e) => {
                error!(error = %e, "Failed to read terminal input");
                AppEvent::Command(AppCommand::Quit)
            }
        };

        let quit = matches!(event, AppEvent::Command(AppCommand::Quit));
        if events_tx.send(event).await.is_err() || quit {
            break;
        }
    }
    debug!("Terminal reader stopped");
}

/// One terminal line as an event: a command, or the input echoed back.
pub(crate) fn parse_line(line: &str) -> AppEvent {
    match line.parse::<AppCommand>() {
        Ok(command) => AppEvent::Command(command),
        Err(e) => {
            warn!(error = %e, "Ignoring terminal input");
            AppEvent::UnknownInput {
                input: line.trim().to_string(),
            }
        }
    }
}
