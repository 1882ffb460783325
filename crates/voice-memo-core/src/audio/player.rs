//! Capability interface of the playback collaborator.

use crate::CoreResult;

use std::path::Path;

use async_trait::async_trait;

/// Sound playback as two steps: load, then play.
#[async_trait(?Send)]
pub trait Player {
    /// Loads the sound at `path`; resolves once it is ready to play.
    ///
    /// Replaces any previously loaded sound.
    async fn load(&mut self, path: &Path) -> CoreResult<()>;

    /// Plays the loaded sound to the end. `Ok(false)` means the sound could
    /// not be decoded or rendered.
    async fn play(&mut self) -> CoreResult<bool>;

    /// Player name for logging.
    fn name(&self) -> &str;
}
