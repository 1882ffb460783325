//! Recording lifecycle states and the transport transition table.

use crate::session::Permission;

use thiserror::Error;

/// Lifecycle state of a recording session.
///
/// `Finished` is not terminal: a new `Record` starts a fresh take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing recorded yet.
    #[default]
    Idle,
    /// Capturing audio; metering samples are live.
    Recording,
    /// Capture suspended; metering samples are dropped.
    Paused,
    /// Capture ended, completion not yet confirmed.
    Stopped,
    /// A completed file is available for playback.
    ///
    /// Only a successful completion enters this state; a failed one leaves
    /// the session `Stopped` with the failure kept in the last completion.
    Finished,
}

/// Transport commands accepted by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    /// Start a new take.
    Record,
    /// Suspend the current take.
    Pause,
    /// Continue a paused take.
    Resume,
    /// End the current take.
    Stop,
    /// Completion reported by the recorder.
    Finish {
        /// Whether the recorder produced a usable file.
        succeeded: bool,
    },
    /// Play back the current output, stopping an active take first.
    Play,
}

/// Reasons a transport command was ignored.
///
/// A rejection is never fatal; the session stays where it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `Record` while a take is already active.
    #[error("Already recording!")]
    AlreadyRecording,
    /// `Record` without granted microphone permission.
    #[error("Can't record, no permission granted!")]
    PermissionNotGranted,
    /// `Pause` outside `Recording`.
    #[error("Can't pause, not recording!")]
    NotRecording,
    /// `Resume` outside `Paused`.
    #[error("Can't resume, not paused!")]
    NotPaused,
    /// `Stop` with no active take.
    #[error("Can't stop, not recording!")]
    NothingToStop,
    /// Completion arrived while no stopped take was waiting for it.
    #[error("Completion ignored, no stopped recording")]
    NotStopped,
}

impl SessionState {
    /// Metering samples are only accepted in this state.
    pub fn is_live(self) -> bool {
        self == SessionState::Recording
    }

    /// A take is in progress, paused or not.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Paused)
    }

    /// Label for the combined pause/resume control.
    pub fn pause_label(self) -> &'static str {
        if self == SessionState::Paused {
            "RESUME"
        } else {
            "PAUSE"
        }
    }

    /// Applies `command` to this state.
    ///
    /// Pure transition table: returns the next state, or the [`Rejection`]
    /// when the command is not legal from here. The session controller runs
    /// its side effects around this.
    pub fn apply(
        self,
        command: TransportCommand,
        permission: Permission,
    ) -> Result<SessionState, Rejection> {
        use SessionState::*;

        match (command, self) {
            (TransportCommand::Record, Recording | Paused) => Err(Rejection::AlreadyRecording),
            (TransportCommand::Record, _) if !permission.is_granted() => {
                Err(Rejection::PermissionNotGranted)
            }
            (TransportCommand::Record, _) => Ok(Recording),

            (TransportCommand::Pause, Recording) => Ok(Paused),
            (TransportCommand::Pause, _) => Err(Rejection::NotRecording),

            (TransportCommand::Resume, Paused) => Ok(Recording),
            (TransportCommand::Resume, _) => Err(Rejection::NotPaused),

            (TransportCommand::Stop, Recording | Paused) => Ok(Stopped),
            (TransportCommand::Stop, _) => Err(Rejection::NothingToStop),

            (TransportCommand::Finish { succeeded: true }, Stopped | Finished) => Ok(Finished),
            (TransportCommand::Finish { succeeded: false }, Stopped) => Ok(Stopped),
            (TransportCommand::Finish { succeeded: false }, Finished) => Ok(Finished),
            (TransportCommand::Finish { .. }, _) => Err(Rejection::NotStopped),

            (TransportCommand::Play, Recording | Paused) => Ok(Stopped),
            (TransportCommand::Play, state) => Ok(state),
        }
    }
}
