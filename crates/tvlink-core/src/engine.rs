//! Media engine seam
//!
//! The controller never decodes or renders anything itself. It drives an
//! engine through [`PlayerEngine`] and learns about progress through
//! [`EngineEvent`]s the host feeds back into
//! [`SessionController::handle_engine_event`](crate::SessionController::handle_engine_event).
//!
//! Engine calls are fire-and-forget: they start work and return, completion
//! is reported later as events.

use crate::quality::VideoSizeConstraint;
use crate::source::MediaSource;
use crate::types::{EngineState, PlaybackError, ResizeMode, TrackGroup};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Capabilities the controller needs from a media engine
pub trait PlayerEngine: Send + Sync {
    /// Replace the media source, prepare it and start playing when ready
    fn load(&self, source: &MediaSource) -> Result<()>;

    /// Prepare the current source again after an error
    fn prepare(&self) -> Result<()>;

    /// Jump to the default position (the live edge for live streams)
    fn seek_to_default_position(&self) -> Result<()>;

    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    /// Install a video size constraint, `None` clears it
    fn set_video_size_constraint(&self, constraint: Option<VideoSizeConstraint>) -> Result<()>;

    fn set_resize_mode(&self, mode: ResizeMode) -> Result<()>;

    /// Free decoder and network resources. Called once.
    fn release(&self);
}

/// Callbacks raised by the engine and its view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Available tracks changed (new source, new manifest)
    TracksChanged(Vec<TrackGroup>),
    /// Lifecycle state changed
    StateChanged(EngineState),
    /// Playback failed; the last state stays in place
    Error(PlaybackError),
    /// Player controls were shown or hidden
    ControlsVisibilityChanged(bool),
}
