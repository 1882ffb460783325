use crate::AppCommand;

use voice_memo_core::RecorderEvent;

/// Everything the event loop reacts to, in arrival order.
#[derive(Debug)]
pub enum AppEvent {
    /// A parsed terminal command.
    Command(AppCommand),
    /// A terminal line that was not a command.
    UnknownInput {
        /// The trimmed line.
        input: String,
    },
    /// Progress or completion from the recorder.
    Recorder(RecorderEvent),
}
