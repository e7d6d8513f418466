//! Preferred quality and the track-selection constraint it maps to

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Width cap applied when a height is pinned
pub const MAX_VIDEO_WIDTH: u32 = 1920;

/// Quality the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    /// Let adaptive selection decide
    #[default]
    Auto,
    /// Pin the vertical resolution
    Height(u32),
    /// Label that could not be read; the installed constraint stays as is
    Unrecognised,
}

impl Quality {
    /// Parse a label such as `"Auto"`, `"720p"` or `"1080"`
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("auto") {
            return Some(Quality::Auto);
        }
        let digits = label.strip_suffix(['p', 'P']).unwrap_or(label);
        match digits.parse::<u32>() {
            Ok(height) if height > 0 => Some(Quality::Height(height)),
            _ => None,
        }
    }

    /// Parse a bridge label. Absent means `Auto`, unreadable labels are
    /// kept apart so they do not clear a pinned height.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            None => Quality::Auto,
            Some(label) => Quality::parse(label).unwrap_or_else(|| {
                warn!(label, "Unrecognised quality label, keeping current constraint");
                Quality::Unrecognised
            }),
        }
    }

    /// False when applying this quality must leave the engine untouched
    pub fn is_recognised(&self) -> bool {
        !matches!(self, Quality::Unrecognised)
    }

    /// Constraint to install on the engine, `None` clears any constraint
    pub fn constraint(&self) -> Option<VideoSizeConstraint> {
        match self {
            Quality::Height(h) => Some(VideoSizeConstraint::pinned_height(*h)),
            Quality::Auto | Quality::Unrecognised => None,
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Auto => write!(f, "Auto"),
            Quality::Height(h) => write!(f, "{h}p"),
            Quality::Unrecognised => write!(f, "unrecognised"),
        }
    }
}

/// Video size bounds for the engine's track selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSizeConstraint {
    pub max_width: u32,
    pub max_height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl VideoSizeConstraint {
    /// Exactly `height` lines; width stays adaptive up to the cap
    pub fn pinned_height(height: u32) -> Self {
        Self {
            max_width: MAX_VIDEO_WIDTH,
            max_height: height,
            min_width: 0,
            min_height: height,
        }
    }

    pub fn allows(&self, width: u32, height: u32) -> bool {
        (self.min_width..=self.max_width).contains(&width)
            && (self.min_height..=self.max_height).contains(&height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(Quality::parse("Auto"), Some(Quality::Auto));
        assert_eq!(Quality::parse("auto"), Some(Quality::Auto));
        assert_eq!(Quality::parse("720p"), Some(Quality::Height(720)));
        assert_eq!(Quality::parse("1080"), Some(Quality::Height(1080)));
        assert_eq!(Quality::parse("HD"), None);
        assert_eq!(Quality::parse("0p"), None);
    }

    #[test]
    fn test_unreadable_label_is_kept_apart() {
        assert_eq!(Quality::from_label(None), Quality::Auto);
        assert_eq!(Quality::from_label(Some("best")), Quality::Unrecognised);
        assert_eq!(Quality::from_label(Some("480p")), Quality::Height(480));
        assert!(!Quality::Unrecognised.is_recognised());
        assert!(Quality::Auto.is_recognised());
    }

    #[test]
    fn test_pinned_constraint() {
        let c = Quality::Height(720).constraint().unwrap();
        assert_eq!(c.max_width, 1920);
        assert_eq!(c.max_height, 720);
        assert_eq!(c.min_height, 720);
        assert!(c.allows(1280, 720));
        assert!(!c.allows(1920, 1080));
        assert!(!c.allows(640, 360));
    }

    #[test]
    fn test_auto_clears_constraint() {
        assert_eq!(Quality::Auto.constraint(), None);
    }
}
