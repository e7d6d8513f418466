//! Events forwarded to the UI
//!
//! Each event is a pure projection of an engine callback. They serialize as
//! method invocations on the UI channel:
//!
//! ```json
//! {"method": "onTracksChanged", "arguments": {"qualities": [1080, 720]}}
//! ```

use crate::types::{TrackGroup, TrackType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::debug;

/// Notification sent to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "arguments")]
pub enum PlayerEvent {
    /// Distinct available video heights, highest first
    #[serde(rename = "onTracksChanged")]
    TracksChanged { qualities: Vec<u32> },

    /// Raw engine state code
    #[serde(rename = "onPlaybackState")]
    PlaybackState { state: i32 },

    /// Non-recoverable playback error
    #[serde(rename = "onError")]
    Error { message: String, code: i32 },

    #[serde(rename = "onControlsVisibilityChange")]
    ControlsVisibilityChange {
        #[serde(rename = "isVisible")]
        is_visible: bool,
    },
}

impl PlayerEvent {
    /// Name of the UI method this event invokes
    pub fn method_name(&self) -> &'static str {
        match self {
            PlayerEvent::TracksChanged { .. } => "onTracksChanged",
            PlayerEvent::PlaybackState { .. } => "onPlaybackState",
            PlayerEvent::Error { .. } => "onError",
            PlayerEvent::ControlsVisibilityChange { .. } => "onControlsVisibilityChange",
        }
    }
}

/// Distinct video heights across all video groups, highest first.
/// Formats with an unknown (zero) height are skipped.
pub fn available_qualities(groups: &[TrackGroup]) -> Vec<u32> {
    let heights: BTreeSet<u32> = groups
        .iter()
        .filter(|g| g.kind == TrackType::Video)
        .flat_map(|g| g.formats.iter().map(|f| f.height))
        .filter(|h| *h > 0)
        .collect();
    heights.into_iter().rev().collect()
}

/// Sending half of the UI channel. Detachable so that nothing reaches the
/// UI after teardown.
#[derive(Debug)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<PlayerEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<PlayerEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Fire-and-forget; a closed or detached channel drops the event
    pub fn emit(&self, event: PlayerEvent) {
        match &self.tx {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!("UI channel closed, event dropped");
                }
            }
            None => debug!(method = event.method_name(), "Event sink detached, event dropped"),
        }
    }

    pub fn detach(&mut self) {
        self.tx = None;
    }
}
