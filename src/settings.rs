//! Playback Settings
//!
//! Named limits and defaults for animation playback. A host application can
//! load [`AnimationSettings`] from its own configuration file (the struct is
//! `serde`-compatible and every field has a default) and hand it to
//! [`Controller::with_settings`](crate::Controller::with_settings).
//!
//! ```rust,ignore
//! let settings: AnimationSettings = serde_json::from_str(r#"{ "max_speed": 2.0 }"#)?;
//! let controller = Controller::with_settings(settings);
//! ```

use serde::{Deserialize, Serialize};

/// Lowest playback speed a controller accepts. Smaller values are clamped.
pub const MIN_PLAYBACK_SPEED: f32 = 0.0;

/// Highest playback speed a controller accepts. Larger values are clamped.
pub const MAX_PLAYBACK_SPEED: f32 = 3.0;

/// Speed of a freshly created controller.
pub const DEFAULT_PLAYBACK_SPEED: f32 = 1.0;

/// Continuous skeletal animations loop unless told otherwise.
pub const DEFAULT_CLIP_LOOPING: bool = true;

/// Playback configuration for a [`Controller`](crate::Controller).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Lower bound of the speed clamp.
    pub min_speed: f32,
    /// Upper bound of the speed clamp.
    pub max_speed: f32,
    /// Speed the controller starts with.
    pub default_speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            min_speed: MIN_PLAYBACK_SPEED,
            max_speed: MAX_PLAYBACK_SPEED,
            default_speed: DEFAULT_PLAYBACK_SPEED,
        }
    }
}

impl AnimationSettings {
    /// Returns a copy whose range is usable: non-finite bounds fall back to
    /// the defaults, an inverted range is swapped, and the default speed is
    /// clamped into the range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let mut min = if self.min_speed.is_finite() {
            self.min_speed
        } else {
            MIN_PLAYBACK_SPEED
        };
        let mut max = if self.max_speed.is_finite() {
            self.max_speed
        } else {
            MAX_PLAYBACK_SPEED
        };
        if min > max {
            log::warn!("Playback speed range [{min}, {max}] is inverted, swapping bounds");
            std::mem::swap(&mut min, &mut max);
        }

        let default_speed = if self.default_speed.is_finite() {
            self.default_speed.clamp(min, max)
        } else {
            DEFAULT_PLAYBACK_SPEED.clamp(min, max)
        };

        Self {
            min_speed: min,
            max_speed: max,
            default_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let s = AnimationSettings::default();
        assert_eq!(s.min_speed, MIN_PLAYBACK_SPEED);
        assert_eq!(s.max_speed, MAX_PLAYBACK_SPEED);
        assert_eq!(s.default_speed, DEFAULT_PLAYBACK_SPEED);
    }

    #[test]
    fn sanitized_swaps_inverted_range() {
        let s = AnimationSettings {
            min_speed: 2.0,
            max_speed: 0.5,
            default_speed: 1.0,
        }
        .sanitized();
        assert_eq!(s.min_speed, 0.5);
        assert_eq!(s.max_speed, 2.0);
        assert_eq!(s.default_speed, 1.0);
    }

    #[test]
    fn sanitized_repairs_non_finite_values() {
        let s = AnimationSettings {
            min_speed: f32::NAN,
            max_speed: f32::INFINITY,
            default_speed: f32::NAN,
        }
        .sanitized();
        assert_eq!(s, AnimationSettings::default());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let s: AnimationSettings = serde_json::from_str(r#"{ "max_speed": 2.0 }"#).unwrap();
        assert_eq!(s.min_speed, MIN_PLAYBACK_SPEED);
        assert_eq!(s.max_speed, 2.0);
        assert_eq!(s.default_speed, DEFAULT_PLAYBACK_SPEED);
    }
}
