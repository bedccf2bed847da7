// Handlers - Requests the platform can make of the running frontend
//
// Screenshots are supported. Save state, load state and reset are not: they
// report `Unsupported` so a caller can tell nothing happened.

use crate::error::{FrontendError, Operation};
use crate::video::{save_frame, ScreenshotError, VideoSurfaceManager};
use std::path::Path;
use tracing::{debug, info};

/// Save the frame currently on the display as a PNG
///
/// # Arguments
///
/// * `video` - Owner of the presentation slots
/// * `path` - Destination file
/// * `width` - Output width in pixels
/// * `height` - Output height in pixels
pub fn screenshot(
    video: &VideoSurfaceManager,
    path: &Path,
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    save_frame(path, video.displayed_frame(), width, height)?;
    info!(path = %path.display(), width, height, "screenshot saved");
    Ok(())
}

/// Serialize the running game
pub fn save_state(path: &Path) -> Result<(), FrontendError> {
    debug!(path = %path.display(), "save state requested");
    Err(FrontendError::Unsupported(Operation::SaveState))
}

/// Restore the running game
pub fn load_state(path: &Path) -> Result<(), FrontendError> {
    debug!(path = %path.display(), "load state requested");
    Err(FrontendError::Unsupported(Operation::LoadState))
}

/// Reset the emulated console
pub fn reset(hard: bool) -> Result<(), FrontendError> {
    debug!(hard, "reset requested");
    Err(FrontendError::Unsupported(Operation::Reset))
}
