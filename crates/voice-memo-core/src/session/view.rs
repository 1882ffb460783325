use crate::{
    session::{FinishedRecording, Permission, RecordingSession, SessionState},
    waveform::WaveformBuffer,
};

/// What the presentation layer reads each render tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Lifecycle state.
    pub state: SessionState,
    /// Whole seconds recorded in the current take.
    pub elapsed_seconds: u64,
    /// Label of the pause/resume control.
    pub pause_label: &'static str,
    /// Microphone authorization.
    pub permission: Permission,
    /// Latest completion.
    pub last_finish: Option<FinishedRecording>,
    /// Bar magnitudes, oldest first.
    pub bars: Vec<f32>,
    /// Maximum number of bars.
    pub capacity: usize,
}

impl SessionView {
    pub(crate) fn of(session: &RecordingSession, waveform: &WaveformBuffer) -> Self {
        Self {
            state: session.state(),
            elapsed_seconds: session.elapsed_seconds(),
            pause_label: session.state().pause_label(),
            permission: session.permission(),
            last_finish: session.last_finish().cloned(),
            bars: waveform.snapshot(),
            capacity: waveform.capacity(),
        }
    }
}
