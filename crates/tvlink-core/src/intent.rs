//! Playback intent - what the UI wants on screen

use crate::drm::DrmDescriptor;
use crate::quality::Quality;
use serde::{Deserialize, Serialize};

/// Desired playback configuration at a point in time.
///
/// The controller never mutates a stored intent; a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackIntent {
    pub source_url: String,
    pub drm: Option<DrmDescriptor>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub preferred_quality: Option<Quality>,
}

impl PlaybackIntent {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            drm: None,
            user_agent: None,
            referer: None,
            preferred_quality: None,
        }
    }

    pub fn with_drm(mut self, drm: DrmDescriptor) -> Self {
        self.drm = Some(drm);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.preferred_quality = Some(quality);
        self
    }

    /// Quality to apply; absent means adaptive
    pub fn quality(&self) -> Quality {
        self.preferred_quality.unwrap_or_default()
    }

    /// True when both intents load the same source with the same
    /// credentials, whatever quality they ask for
    pub fn same_source(&self, other: &PlaybackIntent) -> bool {
        self.source_url == other.source_url
            && self.drm == other.drm
            && self.user_agent == other.user_agent
            && self.referer == other.referer
    }
}
