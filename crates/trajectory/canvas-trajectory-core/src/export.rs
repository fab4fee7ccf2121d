//! Flat export/import shapes for a timeline.

use serde::{Deserialize, Serialize};

use crate::ids::CanvasId;
use crate::keyframe::Keyframe;
use crate::point::PointExport;
use crate::segment::TrajectorySegment;
use crate::timeline::CanvasType;

/// Persisted state of one canvas timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasExport {
    #[serde(rename = "canvasID")]
    pub canvas_id: CanvasId,
    pub trajectory: Vec<PointExport>,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    #[serde(rename = "positionSegments")]
    pub position_segments: Vec<TrajectorySegment>,
    #[serde(rename = "orientationSegments")]
    pub orientation_segments: Vec<TrajectorySegment>,
    #[serde(rename = "type")]
    pub canvas_type: CanvasType,
}

fn default_scale() -> f32 {
    1.0
}

/// Keyframes and both partitions as sent to the solver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySnapshot {
    #[serde(rename = "canvasID")]
    pub canvas_id: CanvasId,
    /// Set for inference requests; absent on plain keyframe exports.
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    pub keyframes: Vec<Keyframe>,
    #[serde(rename = "positionSegments")]
    pub position_segments: Vec<TrajectorySegment>,
    #[serde(rename = "orientationSegments")]
    pub orientation_segments: Vec<TrajectorySegment>,
    #[serde(rename = "type")]
    pub canvas_type: CanvasType,
}
