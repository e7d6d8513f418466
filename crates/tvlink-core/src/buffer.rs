//! Live-playback tuning and buffering thresholds
//!
//! Both are handed to the engine with every load:
//! - live-edge tracking (target offset and the playback-speed band used to
//!   drift back towards it)
//! - load control (how much media to keep ahead of and behind the playhead)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Live-edge tracking configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Distance behind the live edge the engine aims for (milliseconds)
    pub target_offset_ms: u64,
    /// Slowest speed used to fall back towards the target offset
    pub min_playback_speed: f32,
    /// Fastest speed used to catch up with the target offset
    pub max_playback_speed: f32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            target_offset_ms: 5000,
            min_playback_speed: 0.98,
            max_playback_speed: 1.02,
        }
    }
}

impl LiveConfig {
    pub fn target_offset(&self) -> Duration {
        Duration::from_millis(self.target_offset_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_playback_speed.is_nan()
            || self.min_playback_speed <= 0.0
            || self.min_playback_speed > 1.0
        {
            return Err(Error::InvalidConfig(format!(
                "min_playback_speed must be in (0, 1], got {}",
                self.min_playback_speed
            )));
        }
        if self.max_playback_speed.is_nan() || self.max_playback_speed < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "max_playback_speed must be >= 1, got {}",
                self.max_playback_speed
            )));
        }
        Ok(())
    }
}

/// Buffering thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadControlConfig {
    /// Buffer the engine always tries to keep (milliseconds)
    pub min_buffer_ms: u64,
    /// Buffer level at which loading pauses (milliseconds)
    pub max_buffer_ms: u64,
    /// Media required before playback starts (milliseconds)
    pub buffer_for_playback_ms: u64,
    /// Media required before playback resumes after a stall (milliseconds)
    pub buffer_for_playback_after_rebuffer_ms: u64,
    /// Already-played media kept for quick seek-back (milliseconds)
    pub back_buffer_ms: u64,
    /// Keep the back buffer aligned to the previous keyframe
    pub retain_back_buffer_from_keyframe: bool,
}

impl Default for LoadControlConfig {
    fn default() -> Self {
        Self {
            min_buffer_ms: 15_000,
            max_buffer_ms: 30_000,
            buffer_for_playback_ms: 1_000,
            buffer_for_playback_after_rebuffer_ms: 1_500,
            back_buffer_ms: 5_000,
            retain_back_buffer_from_keyframe: true,
        }
    }
}

impl LoadControlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_buffer_ms > self.max_buffer_ms {
            return Err(Error::InvalidConfig(format!(
                "min_buffer_ms ({}) exceeds max_buffer_ms ({})",
                self.min_buffer_ms, self.max_buffer_ms
            )));
        }
        if self.buffer_for_playback_ms > self.min_buffer_ms
            || self.buffer_for_playback_after_rebuffer_ms > self.min_buffer_ms
        {
            return Err(Error::InvalidConfig(
                "playback start thresholds must not exceed min_buffer_ms".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_defaults() {
        let live = LiveConfig::default();
        assert_eq!(live.target_offset(), Duration::from_secs(5));
        assert_eq!(live.min_playback_speed, 0.98);
        assert_eq!(live.max_playback_speed, 1.02);
        assert!(live.validate().is_ok());
    }

    #[test]
    fn test_load_control_defaults() {
        let lc = LoadControlConfig::default();
        assert_eq!(lc.min_buffer_ms, 15_000);
        assert_eq!(lc.max_buffer_ms, 30_000);
        assert_eq!(lc.buffer_for_playback_ms, 1_000);
        assert_eq!(lc.buffer_for_playback_after_rebuffer_ms, 1_500);
        assert_eq!(lc.back_buffer_ms, 5_000);
        assert!(lc.validate().is_ok());
    }

    #[test]
    fn test_invalid_buffer_order() {
        let lc = LoadControlConfig {
            min_buffer_ms: 40_000,
            ..Default::default()
        };
        assert!(lc.validate().is_err());
    }

    #[test]
    fn test_invalid_speed_band() {
        let live = LiveConfig {
            max_playback_speed: 0.9,
            ..Default::default()
        };
        assert!(live.validate().is_err());
    }

    #[test]
    fn test_nan_speed_rejected() {
        for live in [
            LiveConfig { min_playback_speed: f32::NAN, ..Default::default() },
            LiveConfig { max_playback_speed: f32::NAN, ..Default::default() },
        ] {
            assert!(live.validate().is_err());
        }
    }
}
