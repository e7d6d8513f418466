//! Core types for tvlink

use crate::buffer::{LiveConfig, LoadControlConfig};
use crate::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to every full reload of the engine source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of the underlying engine.
///
/// Errors are reported out of band and never replace the last known state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing loaded, or playback failed and the engine stopped
    Idle,
    /// Waiting for enough media to start or continue
    Buffering,
    /// Able to play immediately
    Ready,
    /// Reached the end of the media
    Ended,
}

impl EngineState {
    /// Raw state code forwarded to the UI
    pub fn code(&self) -> i32 {
        match self {
            EngineState::Idle => 1,
            EngineState::Buffering => 2,
            EngineState::Ready => 3,
            EngineState::Ended => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(EngineState::Idle),
            2 => Some(EngineState::Buffering),
            3 => Some(EngineState::Ready),
            4 => Some(EngineState::Ended),
            _ => None,
        }
    }

    /// True while a source is loaded and has not finished
    pub fn is_active(&self) -> bool {
        !matches!(self, EngineState::Idle | EngineState::Ended)
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Buffering => write!(f, "buffering"),
            EngineState::Ready => write!(f, "ready"),
            EngineState::Ended => write!(f, "ended"),
        }
    }
}

/// How the video surface is fitted into its view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResizeMode {
    #[default]
    Fit,
    Fill,
    FixedWidth,
    Zoom,
}

impl ResizeMode {
    /// Map a bridge mode number; anything unrecognised falls back to `Fit`
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ResizeMode::Fill,
            2 => ResizeMode::FixedWidth,
            3 => ResizeMode::Zoom,
            _ => ResizeMode::Fit,
        }
    }
}

/// Numeric error code reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineErrorCode(pub i32);

impl EngineErrorCode {
    pub const UNSPECIFIED: Self = Self(1000);
    pub const REMOTE_ERROR: Self = Self(1001);
    pub const BEHIND_LIVE_WINDOW: Self = Self(1002);
    pub const TIMEOUT: Self = Self(1003);
    pub const IO_UNSPECIFIED: Self = Self(2000);
    pub const IO_NETWORK_CONNECTION_FAILED: Self = Self(2001);
    pub const IO_NETWORK_CONNECTION_TIMEOUT: Self = Self(2002);
    pub const IO_INVALID_HTTP_CONTENT_TYPE: Self = Self(2003);
    pub const IO_BAD_HTTP_STATUS: Self = Self(2004);
    pub const IO_FILE_NOT_FOUND: Self = Self(2005);
    pub const IO_READ_POSITION_OUT_OF_RANGE: Self = Self(2008);
    pub const PARSING_CONTAINER_MALFORMED: Self = Self(3001);
    pub const PARSING_MANIFEST_MALFORMED: Self = Self(3002);
    pub const DECODER_INIT_FAILED: Self = Self(4001);
    pub const DRM_UNSPECIFIED: Self = Self(6000);

    /// Errors that a reposition to the live edge and a fresh prepare fix
    pub fn is_recoverable(&self) -> bool {
        matches!(
            *self,
            Self::BEHIND_LIVE_WINDOW
                | Self::IO_NETWORK_CONNECTION_TIMEOUT
                | Self::IO_READ_POSITION_OUT_OF_RANGE
        )
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::UNSPECIFIED => "unspecified",
            Self::REMOTE_ERROR => "remote_error",
            Self::BEHIND_LIVE_WINDOW => "behind_live_window",
            Self::TIMEOUT => "timeout",
            Self::IO_UNSPECIFIED => "io_unspecified",
            Self::IO_NETWORK_CONNECTION_FAILED => "io_network_connection_failed",
            Self::IO_NETWORK_CONNECTION_TIMEOUT => "io_network_connection_timeout",
            Self::IO_INVALID_HTTP_CONTENT_TYPE => "io_invalid_http_content_type",
            Self::IO_BAD_HTTP_STATUS => "io_bad_http_status",
            Self::IO_FILE_NOT_FOUND => "io_file_not_found",
            Self::IO_READ_POSITION_OUT_OF_RANGE => "io_read_position_out_of_range",
            Self::PARSING_CONTAINER_MALFORMED => "parsing_container_malformed",
            Self::PARSING_MANIFEST_MALFORMED => "parsing_manifest_malformed",
            Self::DECODER_INIT_FAILED => "decoder_init_failed",
            Self::DRM_UNSPECIFIED => "drm_unspecified",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Error reported by the engine through its callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackError {
    pub code: EngineErrorCode,
    pub message: String,
}

impl PlaybackError {
    pub fn new(code: EngineErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Kind of media carried by a track group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackType {
    Video,
    Audio,
    Text,
    Other,
}

/// One selectable format inside a track group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackFormat {
    pub width: u32,
    /// Zero when the engine does not know the height
    pub height: u32,
    pub bitrate: Option<u64>,
}

impl TrackFormat {
    pub fn video(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bitrate: None,
        }
    }
}

/// Group of alternative formats for one track, as discovered by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackGroup {
    pub kind: TrackType,
    pub formats: Vec<TrackFormat>,
}

impl TrackGroup {
    pub fn new(kind: TrackType, formats: Vec<TrackFormat>) -> Self {
        Self { kind, formats }
    }
}

/// Player configuration
///
/// Defaults reproduce the tuning used for live IPTV streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// HTTP transport applied to every load
    pub transport: TransportConfig,
    /// Live-edge tracking
    pub live: LiveConfig,
    /// Buffering thresholds
    pub load_control: LoadControlConfig,
}

impl PlayerConfig {
    /// Parse a configuration document; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the engine cannot honour
    pub fn validate(&self) -> crate::Result<()> {
        self.live.validate()?;
        self.load_control.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_state_codes() {
        for state in [
            EngineState::Idle,
            EngineState::Buffering,
            EngineState::Ready,
            EngineState::Ended,
        ] {
            assert_eq!(EngineState::from_code(state.code()), Some(state));
        }
        assert_eq!(EngineState::from_code(9), None);
    }

    #[test]
    fn test_engine_state_active() {
        assert!(!EngineState::Idle.is_active());
        assert!(EngineState::Buffering.is_active());
        assert!(EngineState::Ready.is_active());
        assert!(!EngineState::Ended.is_active());
    }

    #[test]
    fn test_resize_mode_mapping() {
        assert_eq!(ResizeMode::from_code(0), ResizeMode::Fit);
        assert_eq!(ResizeMode::from_code(1), ResizeMode::Fill);
        assert_eq!(ResizeMode::from_code(2), ResizeMode::FixedWidth);
        assert_eq!(ResizeMode::from_code(3), ResizeMode::Zoom);
        assert_eq!(ResizeMode::from_code(99), ResizeMode::Fit);
        assert_eq!(ResizeMode::from_code(-1), ResizeMode::Fit);
    }

    #[test]
    fn test_recoverable_codes() {
        assert!(EngineErrorCode::BEHIND_LIVE_WINDOW.is_recoverable());
        assert!(EngineErrorCode::IO_NETWORK_CONNECTION_TIMEOUT.is_recoverable());
        assert!(EngineErrorCode::IO_READ_POSITION_OUT_OF_RANGE.is_recoverable());
        assert!(!EngineErrorCode::IO_BAD_HTTP_STATUS.is_recoverable());
        assert!(!EngineErrorCode(424242).is_recoverable());
    }

    #[test]
    fn test_partial_config_json() {
        let config = PlayerConfig::from_json(r#"{"live": {"target_offset_ms": 8000}}"#).unwrap();
        assert_eq!(config.live.target_offset_ms, 8000);
        assert_eq!(config.live.max_playback_speed, 1.02);
        assert_eq!(config.load_control, LoadControlConfig::default());
    }
}
