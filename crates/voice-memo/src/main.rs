//! Voice-Memo: record, pause, stop and play back a voice memo from the
//! terminal, with a live waveform.

mod app;
mod app_command;
mod app_event;
mod config;
mod error;
mod logging;
mod status_line;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    app_event::AppEvent,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::time::Duration;

use tracing::{error, info};

/// Time given to the terminal reader to notice shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Application entry point.
fn main() {
    // Logging failures are reported on stderr; the app still works without a log file.
    match logging::init_logging() {
        Ok(log_dir) => info!(log_dir = ?log_dir, "Logging to file"),
        Err(e) => eprintln!("Failed to initialize logging: {}", e),
    }

    let config = match Config::load().and_then(|c| c.validate().map(|()| c)) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async {
        let app = App::new(&config)?;
        app.run().await
    });

    // The terminal reader may still be parked on stdin.
    rt.shutdown_timeout(SHUTDOWN_TIMEOUT);

    if let Err(e) = result {
        error!(error = ?e, "App error");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
