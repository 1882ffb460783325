use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands typed on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new take.
    Record,
    /// Pause a running take, or resume a paused one.
    TogglePause,
    /// End the current take.
    Stop,
    /// Play the last take, stopping an active one first.
    Play,
    /// Request application shutdown.
    Quit,
}

impl AppCommand {
    /// One-line usage shown at startup.
    pub const HELP: &'static str =
        "commands: [r]ecord  [p]ause/resume  [s]top  p[l]ay  [q]uit";
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let word = input.trim().to_ascii_lowercase();
        match word.as_str() {
            "r" | "record" => Ok(AppCommand::Record),
            "p" | "pause" | "resume" => Ok(AppCommand::TogglePause),
            "s" | "stop" => Ok(AppCommand::Stop),
            "l" | "play" => Ok(AppCommand::Play),
            "q" | "quit" | "exit" => Ok(AppCommand::Quit),
            _ => Err(AppError::UnknownCommand {
                input: word,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
