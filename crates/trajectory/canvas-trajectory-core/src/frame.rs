//! Projection capability consumed by the timeline.
//!
//! A [`Frame`] maps between world space, normalized screen space and depth for
//! one video frame. A [`Clip`] is the ordered sequence of frames of the video
//! the canvases are pinned to. Both are supplied by the host; the timeline only
//! calls them while resolving keyframe poses and answering pose queries.
//!
//! [`OrthoClip`] is a headless reference implementation (camera looking down -z
//! with an identity orientation) used by tests and tools that run without a
//! renderer.

use std::fmt;

use crate::math::{Rotation, Vec2, Vec3};

/// Per-frame world/screen/depth mapping.
pub trait Frame {
    /// World point to normalized screen coordinate.
    fn project(&self, world: Vec3) -> Vec2;
    /// Depth of a world point as seen from this frame's camera.
    fn get_depth(&self, world: Vec3) -> f32;
    /// Inverse of [`Frame::project`] at a given depth.
    fn screen_space_to_world_space(&self, x: f32, y: f32, depth: f32) -> Vec3;
    fn convert_to_world_rotation(&self, rotation: &Rotation) -> Rotation;
    fn convert_to_local_rotation(&self, rotation: &Rotation) -> Rotation;
}

/// The video timeline: one [`Frame`] per frame index.
pub trait Clip: fmt::Debug {
    /// Clip name sent along with solver requests.
    fn name(&self) -> &str;
    fn frame_count(&self) -> usize;
    fn frame(&self, time: usize) -> Option<&dyn Frame>;
}

/// Orthographic frame with a translated camera.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrthoFrame {
    pub camera: Vec3,
}

impl OrthoFrame {
    pub fn new(camera: Vec3) -> Self {
        Self { camera }
    }
}

impl Frame for OrthoFrame {
    fn project(&self, world: Vec3) -> Vec2 {
        let local = world - self.camera;
        Vec2::new((local.x + 1.0) / 2.0, -(local.y - 1.0) / 2.0)
    }

    fn get_depth(&self, world: Vec3) -> f32 {
        (world - self.camera).z
    }

    fn screen_space_to_world_space(&self, x: f32, y: f32, depth: f32) -> Vec3 {
        Vec3::new(x * 2.0 - 1.0, -y * 2.0 + 1.0, depth) + self.camera
    }

    fn convert_to_world_rotation(&self, rotation: &Rotation) -> Rotation {
        *rotation
    }

    fn convert_to_local_rotation(&self, rotation: &Rotation) -> Rotation {
        *rotation
    }
}

#[derive(Clone, Debug, Default)]
pub struct OrthoClip {
    name: String,
    frames: Vec<OrthoFrame>,
}

impl OrthoClip {
    pub fn new(name: impl Into<String>, frames: Vec<OrthoFrame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    /// `len` frames sharing a camera at the origin.
    pub fn still(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![OrthoFrame::default(); len])
    }

    /// `len` frames whose camera moves by `step` every frame.
    pub fn panning(name: impl Into<String>, len: usize, step: Vec3) -> Self {
        let frames = (0..len)
            .map(|i| {
                let i = i as f32;
                OrthoFrame::new(Vec3::new(step.x * i, step.y * i, step.z * i))
            })
            .collect();
        Self::new(name, frames)
    }
}

impl Clip for OrthoClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, time: usize) -> Option<&dyn Frame> {
        self.frames.get(time).map(|f| f as &dyn Frame)
    }
}
