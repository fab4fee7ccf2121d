//! Pose value types carried through the timeline.
//!
//! The timeline never does algebra on rotations; `Rotation` is an opaque 4x4
//! transform token. Projection math belongs to the [`Frame`](crate::frame::Frame)
//! implementation supplied by the host.

use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Normalized screen coordinate (0..1 on both axes, y pointing down).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both components into [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// World-space point or offset.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Opaque orientation token: a 4x4 transform stored column-major.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rotation {
    pub elements: [f32; 16],
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation {
        elements: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn from_elements(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    /// Embed a row-major 3x3 rotation into the upper-left block of a 4x4.
    pub fn from_row_major_3x3(m: [f32; 9]) -> Self {
        Self {
            elements: [
                m[0], m[3], m[6], 0.0, //
                m[1], m[4], m[7], 0.0, //
                m[2], m[5], m[8], 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Decode a solver orientation: 9 values are a row-major 3x3, 16 values are
    /// column-major 4x4 elements. Any other length is rejected.
    pub fn from_wire(values: &[f32]) -> Option<Self> {
        match values.len() {
            9 => {
                let mut m = [0.0f32; 9];
                m.copy_from_slice(values);
                Some(Self::from_row_major_3x3(m))
            }
            16 => {
                let mut e = [0.0f32; 16];
                e.copy_from_slice(values);
                Some(Self::from_elements(e))
            }
            _ => None,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_3x3_lands_column_major() {
        let r = Rotation::from_row_major_3x3([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        // First column holds the first entry of each row.
        assert_eq!(&r.elements[0..4], &[1.0, 4.0, 7.0, 0.0]);
        assert_eq!(&r.elements[4..8], &[2.0, 5.0, 8.0, 0.0]);
        assert_eq!(&r.elements[12..16], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn from_wire_rejects_odd_lengths() {
        assert!(Rotation::from_wire(&[1.0; 4]).is_none());
        assert_eq!(
            Rotation::from_wire(&Rotation::IDENTITY.elements),
            Some(Rotation::IDENTITY)
        );
    }

    #[test]
    fn vec3_serializes_as_object() {
        let v = serde_json::to_value(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(v, serde_json::json!({"x": 1.0, "y": 2.0, "z": 3.0}));
    }
}
