//! Per-frame resolved pose.

use serde::{Deserialize, Serialize};

use crate::math::{Rotation, Vec3};

/// Which half of the pose a solver result refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseKind {
    Position,
    Orientation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryPoint {
    pub position: Vec3,
    pub rotation: Rotation,
    pub position_solved: bool,
    pub rotation_solved: bool,
}

impl TrajectoryPoint {
    /// A point whose pose is taken as current.
    pub fn new(position: Vec3, rotation: Rotation) -> Self {
        Self {
            position,
            rotation,
            position_solved: true,
            rotation_solved: true,
        }
    }

    #[inline]
    pub fn solved(&self) -> bool {
        self.position_solved && self.rotation_solved
    }

    #[inline]
    pub fn is_solved(&self, kind: PoseKind) -> bool {
        match kind {
            PoseKind::Position => self.position_solved,
            PoseKind::Orientation => self.rotation_solved,
        }
    }

    pub fn export(&self) -> PointExport {
        PointExport {
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// Persisted form of a trajectory point (solved flags are not stored).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointExport {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Rotation,
}

impl From<PointExport> for TrajectoryPoint {
    fn from(p: PointExport) -> Self {
        TrajectoryPoint::new(p.position, p.rotation)
    }
}
