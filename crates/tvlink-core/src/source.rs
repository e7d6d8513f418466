//! Media source description handed to the engine on every full reload

use crate::buffer::{LiveConfig, LoadControlConfig};
use crate::drm::DrmConfig;
use crate::intent::PlaybackIntent;
use crate::transport::RequestProfile;
use crate::types::PlayerConfig;
use serde::Serialize;

/// Container format hint derived from the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContainerHint {
    Hls,
    Dash,
    /// Raw MPEG transport stream, as Xtream-style panels serve on `/live/`
    TransportStream,
}

impl ContainerHint {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ContainerHint::Hls => "application/x-mpegURL",
            ContainerHint::Dash => "application/dash+xml",
            ContainerHint::TransportStream => "video/mp2t",
        }
    }
}

impl std::fmt::Display for ContainerHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Guess the container from the URL. `None` lets the engine sniff it.
pub fn infer_container(url: &str) -> Option<ContainerHint> {
    let url = url.to_lowercase();
    if url.contains(".m3u8") || url.contains("extension=m3u8") {
        return Some(ContainerHint::Hls);
    }
    if url.contains(".mpd") || url.contains("format=mpd") {
        return Some(ContainerHint::Dash);
    }
    if url.contains("/live/") || url.contains("/stream/") {
        return Some(ContainerHint::TransportStream);
    }
    None
}

/// Everything the engine needs to (re)build its media source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSource {
    pub uri: String,
    pub container: Option<ContainerHint>,
    pub transport: RequestProfile,
    pub drm: Option<DrmConfig>,
    pub live: LiveConfig,
    pub load_control: LoadControlConfig,
}

impl MediaSource {
    /// Build the source for an intent. DRM is resolved by the caller so that
    /// it can decide how to handle malformed key material.
    pub fn from_intent(intent: &PlaybackIntent, drm: Option<DrmConfig>, config: &PlayerConfig) -> Self {
        Self {
            uri: intent.source_url.clone(),
            container: infer_container(&intent.source_url),
            transport: config
                .transport
                .for_request(intent.user_agent.as_deref(), intent.referer.as_deref()),
            drm,
            live: config.live,
            load_control: config.load_control,
        }
    }

    pub fn mime_type(&self) -> Option<&'static str> {
        self.container.map(|c| c.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_hls() {
        assert_eq!(
            infer_container("https://x.com/stream.m3u8?token=1"),
            Some(ContainerHint::Hls)
        );
        assert_eq!(
            infer_container("http://panel.tv/get.php?extension=M3U8"),
            Some(ContainerHint::Hls)
        );
    }

    #[test]
    fn test_infer_dash() {
        assert_eq!(infer_container("https://x.com/video.mpd"), Some(ContainerHint::Dash));
        assert_eq!(
            infer_container("https://x.com/manifest?format=mpd"),
            Some(ContainerHint::Dash)
        );
    }

    #[test]
    fn test_infer_transport_stream() {
        assert_eq!(
            infer_container("https://x.com/live/chan1"),
            Some(ContainerHint::TransportStream)
        );
        assert_eq!(
            infer_container("https://x.com/STREAM/42.ts"),
            Some(ContainerHint::TransportStream)
        );
    }

    #[test]
    fn test_manifest_wins_over_live_path() {
        assert_eq!(
            infer_container("https://x.com/live/user/pass/1.m3u8"),
            Some(ContainerHint::Hls)
        );
    }

    #[test]
    fn test_no_hint() {
        assert_eq!(infer_container("https://x.com/file.mp4"), None);
    }

    #[test]
    fn test_source_from_intent() {
        let intent = PlaybackIntent::new("https://x.com/live/chan1").with_referer("https://panel/");
        let source = MediaSource::from_intent(&intent, None, &PlayerConfig::default());
        assert_eq!(source.mime_type(), Some("video/mp2t"));
        assert_eq!(source.transport.header("Referer"), Some("https://panel/"));
        assert_eq!(source.live.target_offset_ms, 5000);
        assert!(source.drm.is_none());
    }
}
