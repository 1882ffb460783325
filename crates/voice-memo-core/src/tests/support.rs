use crate::{
    CompletionDelivery, ControllerSettings, CoreError, CoreResult, Player, Recorder,
    RecordingConfig, SessionController,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use error_location::ErrorLocation;

pub(crate) const OUTPUT: &str = "memo/test.wav";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecorderCall {
    RequestAuthorization,
    Prepare(PathBuf),
    Start,
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlayerCall {
    Load(PathBuf),
    Play,
}

/// In-memory recorder that logs every call and fails on request.
pub(crate) struct FakeRecorder {
    pub authorized: bool,
    pub delivery: CompletionDelivery,
    pub fail_start: bool,
    pub fail_pause: bool,
    pub fail_resume: bool,
    pub fail_stop: bool,
    pub calls: Vec<RecorderCall>,
    pub prepared: Option<PathBuf>,
}

impl FakeRecorder {
    pub fn granted() -> Self {
        Self {
            authorized: true,
            delivery: CompletionDelivery::Event,
            fail_start: false,
            fail_pause: false,
            fail_resume: false,
            fail_stop: false,
            calls: Vec::new(),
            prepared: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            authorized: false,
            ..Self::granted()
        }
    }

    pub fn count(&self, call: &RecorderCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

#[track_caller]
pub(crate) fn device_error(reason: &str) -> CoreError {
    CoreError::DeviceError {
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[async_trait(?Send)]
impl Recorder for FakeRecorder {
    async fn request_authorization(&mut self) -> bool {
        self.calls.push(RecorderCall::RequestAuthorization);
        self.authorized
    }

    fn prepare_recording_at_path(
        &mut self,
        path: &Path,
        _config: &RecordingConfig,
    ) -> CoreResult<()> {
        self.calls.push(RecorderCall::Prepare(path.to_path_buf()));
        self.prepared = Some(path.to_path_buf());
        Ok(())
    }

    async fn start_recording(&mut self) -> CoreResult<()> {
        self.calls.push(RecorderCall::Start);
        if self.fail_start {
            return Err(device_error("start refused"));
        }
        Ok(())
    }

    async fn pause_recording(&mut self) -> CoreResult<()> {
        self.calls.push(RecorderCall::Pause);
        if self.fail_pause {
            return Err(device_error("pause refused"));
        }
        Ok(())
    }

    async fn resume_recording(&mut self) -> CoreResult<()> {
        self.calls.push(RecorderCall::Resume);
        if self.fail_resume {
            return Err(device_error("resume refused"));
        }
        Ok(())
    }

    async fn stop_recording(&mut self) -> CoreResult<PathBuf> {
        self.calls.push(RecorderCall::Stop);
        if self.fail_stop {
            return Err(device_error("stop refused"));
        }
        self.prepared
            .clone()
            .ok_or_else(|| device_error("stopped without prepare"))
    }

    fn completion_delivery(&self) -> CompletionDelivery {
        self.delivery
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// In-memory player that logs every call.
pub(crate) struct FakePlayer {
    pub fail_load: bool,
    pub play_result: bool,
    pub calls: Vec<PlayerCall>,
}

impl Default for FakePlayer {
    fn default() -> Self {
        Self {
            fail_load: false,
            play_result: true,
            calls: Vec::new(),
        }
    }
}

#[async_trait(?Send)]
impl Player for FakePlayer {
    async fn load(&mut self, path: &Path) -> CoreResult<()> {
        self.calls.push(PlayerCall::Load(path.to_path_buf()));
        if self.fail_load {
            return Err(device_error("load refused"));
        }
        Ok(())
    }

    async fn play(&mut self) -> CoreResult<bool> {
        self.calls.push(PlayerCall::Play);
        Ok(self.play_result)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub(crate) type FakeController = SessionController<FakeRecorder, FakePlayer>;

pub(crate) fn controller_with(recorder: FakeRecorder, player: FakePlayer) -> FakeController {
    SessionController::new(
        recorder,
        player,
        ControllerSettings {
            output_path: PathBuf::from(OUTPUT),
            ..ControllerSettings::default()
        },
    )
}

/// Controller with permission granted and output prepared.
pub(crate) async fn granted_controller() -> FakeController {
    let mut controller = controller_with(FakeRecorder::granted(), FakePlayer::default());
    controller.initialize().await;
    controller
}
