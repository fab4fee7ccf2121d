//! Core configuration for canvas timelines.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::timeline::CanvasType;

/// Defaults applied when canvases are created or re-centered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Screen anchor of the keyframe installed on new and newly static canvases.
    pub recenter: Vec2,
    /// Depth used to unproject the anchor when a canvas is first created.
    pub default_depth: f32,
    pub default_scale: f32,
    pub initial_type: CanvasType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recenter: Vec2::new(0.5, 0.5),
            default_depth: 0.0,
            default_scale: 1.0,
            initial_type: CanvasType::Static,
        }
    }
}

impl Config {
    /// Parse a JSON override; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
