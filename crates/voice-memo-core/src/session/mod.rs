mod controller;
mod permission;
mod recording_session;
mod state;
mod view;

pub use {
    controller::{CommandOutcome, ControllerSettings, SessionController},
    permission::Permission,
    recording_session::{FinishedRecording, RecordingSession},
    state::{Rejection, SessionState, TransportCommand},
    view::SessionView,
};
