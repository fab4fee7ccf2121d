use canvas_trajectory_core::CanvasExport;
use serde::{Deserialize, Serialize};

/// Every canvas of a session plus the clip they were authored against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneExport {
    pub canvases: Vec<CanvasExport>,
    pub clip: String,
}

impl SceneExport {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
