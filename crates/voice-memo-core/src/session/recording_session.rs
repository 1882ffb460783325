use crate::session::{Permission, SessionState};

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Completion metadata reported by the recorder for one take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecording {
    /// Whether the recorder produced a usable file.
    pub succeeded: bool,
    /// Location of the recorded file.
    pub path: PathBuf,
    /// File size in bytes, when the recorder reports it.
    pub size_bytes: Option<u64>,
}

/// Mutable state of the recorder screen.
///
/// Only [`SessionController`](crate::SessionController) mutates it; views get
/// read access.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    state: SessionState,
    elapsed_seconds: u64,
    output_path: PathBuf,
    permission: Permission,
    stopped_recording: bool,
    take_id: Option<Uuid>,
    last_finish: Option<FinishedRecording>,
}

impl RecordingSession {
    /// A fresh session in `Idle` with unresolved permission.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            state: SessionState::Idle,
            elapsed_seconds: 0,
            output_path: output_path.into(),
            permission: Permission::Unknown,
            stopped_recording: false,
            take_id: None,
            last_finish: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whole seconds recorded in the current take.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Destination of the current take.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Microphone authorization.
    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Id of the current take, for log correlation.
    pub fn take_id(&self) -> Option<Uuid> {
        self.take_id
    }

    /// The latest completion, possibly from an earlier take.
    pub fn last_finish(&self) -> Option<&FinishedRecording> {
        self.last_finish.as_ref()
    }

    /// Whether a previous take reached `Stopped`, so the output must be
    /// prepared again before the next one.
    pub fn needs_prepare(&self) -> bool {
        self.stopped_recording
    }

    pub(crate) fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    pub(crate) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    /// Enters `Recording` for a new take with elapsed time reset.
    pub(crate) fn begin_take(&mut self) -> Uuid {
        let take_id = Uuid::new_v4();
        self.state = SessionState::Recording;
        self.elapsed_seconds = 0;
        self.stopped_recording = false;
        self.take_id = Some(take_id);
        take_id
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.state = SessionState::Stopped;
        self.stopped_recording = true;
    }

    /// Advances elapsed time; ignored outside `Recording` and never moves
    /// backwards.
    pub(crate) fn advance_elapsed(&mut self, seconds: u64) {
        if self.state.is_live() && seconds > self.elapsed_seconds {
            self.elapsed_seconds = seconds;
        }
    }

    pub(crate) fn record_finish(&mut self, finish: FinishedRecording) {
        self.last_finish = Some(finish);
    }
}
