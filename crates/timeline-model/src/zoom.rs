//! Zoom scale state and its clamping rules.
//!
//! The scale is a pure view concern: it never touches overlay frames,
//! only how many pixels a second of timeline occupies.

use serde::{Deserialize, Serialize};

/// Bounds and step sizes for the timeline zoom scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConstraints {
    pub min: f64,
    pub max: f64,
    /// Increment for discrete zoom controls (buttons, keyboard).
    pub step: f64,
    /// Increment per wheel/trackpad notch.
    pub wheel_step: f64,
    pub default: f64,
}

impl Default for ZoomConstraints {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 5.0,
            step: 0.15,
            wheel_step: 0.1,
            default: 1.0,
        }
    }
}

impl ZoomConstraints {
    /// Clamp an arbitrary scale into `[min, max]`.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Persisted zoom state of one editor view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    /// Current zoom scale, always within the constraints.
    pub scale: f64,
    /// Horizontal scroll position of the viewport, in seconds.
    #[serde(default)]
    pub scroll_offset_secs: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            scale: ZoomConstraints::default().default,
            scroll_offset_secs: 0.0,
        }
    }
}
