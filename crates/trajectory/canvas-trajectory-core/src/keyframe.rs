//! Keyframes: sparse, user-authored pose overrides at one frame index.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Rotation;

/// Name of a keyframeable pose property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prop {
    X,
    Y,
    Depth,
    Rot,
}

impl Prop {
    /// Properties that constrain the position partition.
    pub const POSITION: [Prop; 3] = [Prop::X, Prop::Y, Prop::Depth];
    pub const ALL: [Prop; 4] = [Prop::X, Prop::Y, Prop::Depth, Prop::Rot];

    #[inline]
    pub fn is_position(self) -> bool {
        matches!(self, Prop::X | Prop::Y | Prop::Depth)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Prop::X => "x",
            Prop::Y => "y",
            Prop::Depth => "depth",
            Prop::Rot => "rot",
        }
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property together with its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropValue {
    X(f32),
    Y(f32),
    Depth(f32),
    Rot(Rotation),
}

impl PropValue {
    pub fn prop(&self) -> Prop {
        match self {
            PropValue::X(_) => Prop::X,
            PropValue::Y(_) => Prop::Y,
            PropValue::Depth(_) => Prop::Depth,
            PropValue::Rot(_) => Prop::Rot,
        }
    }
}

/// Screen-space bounds enforced on `x` and `y`.
const SCREEN_BOUNDS: (f32, f32) = (0.0, 1.0);

#[inline]
pub(crate) fn clamp_screen(v: f32) -> f32 {
    v.clamp(SCREEN_BOUNDS.0, SCREEN_BOUNDS.1)
}

/// Property bag of a keyframe. Serialized as a mapping holding only the
/// properties that are set, e.g. `{"x": 0.5, "y": 0.5}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rot: Option<Rotation>,
}

impl KeyframeProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen anchor `{x, y}`.
    pub fn xy(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn with_x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_rot(mut self, rot: Rotation) -> Self {
        self.rot = Some(rot);
        self
    }

    pub fn has(&self, prop: Prop) -> bool {
        match prop {
            Prop::X => self.x.is_some(),
            Prop::Y => self.y.is_some(),
            Prop::Depth => self.depth.is_some(),
            Prop::Rot => self.rot.is_some(),
        }
    }

    /// True if any of x, y or depth is set.
    pub fn touches_position(&self) -> bool {
        Prop::POSITION.iter().any(|p| self.has(*p))
    }

    pub fn touches_orientation(&self) -> bool {
        self.rot.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !Prop::ALL.iter().any(|p| self.has(*p))
    }

    /// Names of the properties that are set.
    pub fn props(&self) -> Vec<Prop> {
        Prop::ALL.into_iter().filter(|p| self.has(*p)).collect()
    }

    pub fn values(&self) -> impl Iterator<Item = PropValue> + '_ {
        let x = self.x.map(PropValue::X);
        let y = self.y.map(PropValue::Y);
        let depth = self.depth.map(PropValue::Depth);
        let rot = self.rot.map(PropValue::Rot);
        [x, y, depth, rot].into_iter().flatten()
    }

    /// Copy with `x` and `y` clamped into screen bounds.
    pub fn clamped(mut self) -> Self {
        self.x = self.x.map(clamp_screen);
        self.y = self.y.map(clamp_screen);
        self
    }

    fn take(&mut self, prop: Prop) -> bool {
        match prop {
            Prop::X => self.x.take().is_some(),
            Prop::Y => self.y.take().is_some(),
            Prop::Depth => self.depth.take().is_some(),
            Prop::Rot => self.rot.take().is_some(),
        }
    }
}

/// A user-specified, time-anchored override of one or more pose properties.
///
/// Owned by one timeline and keyed there by `time`. A keyframe whose property
/// bag becomes empty is deleted by its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: usize,
    props: KeyframeProps,
}

impl Keyframe {
    /// Build a keyframe, clamping x/y into screen bounds.
    pub fn new(time: usize, props: KeyframeProps) -> Self {
        let mut kf = Self {
            time,
            props: KeyframeProps::default(),
        };
        kf.merge(&props);
        kf
    }

    /// Add or override a single property.
    pub fn add_property(&mut self, value: PropValue) {
        match value {
            PropValue::X(x) => self.props.x = Some(clamp_screen(x)),
            PropValue::Y(y) => self.props.y = Some(clamp_screen(y)),
            PropValue::Depth(d) => self.props.depth = Some(d),
            PropValue::Rot(r) => self.props.rot = Some(r),
        }
    }

    /// Add or override every property set in `props`.
    pub fn merge(&mut self, props: &KeyframeProps) {
        for value in props.values() {
            self.add_property(value);
        }
    }

    /// Returns whether the property was present.
    pub fn remove_property(&mut self, prop: Prop) -> bool {
        self.props.take(prop)
    }

    #[inline]
    pub fn has_property(&self, prop: Prop) -> bool {
        self.props.has(prop)
    }

    pub fn clear(&mut self) {
        self.props = KeyframeProps::default();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    #[inline]
    pub fn props(&self) -> &KeyframeProps {
        &self.props
    }

    pub fn export(&self) -> Keyframe {
        self.clone()
    }
}
