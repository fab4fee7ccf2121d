//! Trajectory segments: frame ranges sharing one interpolation mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the frames inside a segment are resolved.
///
/// Serialized as an integer (`0` linear, `1` tracking). Any non-zero value
/// reads back as tracking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum InterpolationMode {
    Linear,
    Tracking,
}

impl From<InterpolationMode> for u8 {
    fn from(mode: InterpolationMode) -> u8 {
        match mode {
            InterpolationMode::Linear => 0,
            InterpolationMode::Tracking => 1,
        }
    }
}

impl From<u8> for InterpolationMode {
    fn from(v: u8) -> Self {
        if v == 0 {
            InterpolationMode::Linear
        } else {
            InterpolationMode::Tracking
        }
    }
}

/// Identity key of a segment within its partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId {
    pub start: usize,
    pub end: usize,
}

/// Inclusive frame range `[start, end]` with a mode and a dirty flag.
///
/// `start` and `end` are fixed at construction; a range change means building
/// a replacement segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySegment {
    start: usize,
    end: usize,
    mode: InterpolationMode,
    #[serde(default)]
    dirty: bool,
}

impl TrajectorySegment {
    /// New segments are dirty: their boundary poses are stale for the solver.
    pub fn new(start: usize, end: usize, mode: InterpolationMode) -> Self {
        debug_assert!(start <= end, "segment start {start} > end {end}");
        Self {
            start,
            end,
            mode,
            dirty: true,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        SegmentId {
            start: self.start,
            end: self.end,
        }
    }

    #[inline]
    pub fn contains(&self, time: usize) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn set_linear(&mut self) {
        self.set_mode(InterpolationMode::Linear);
    }

    pub fn set_tracking(&mut self) {
        self.set_mode(InterpolationMode::Tracking);
    }

    /// Change the mode; only an actual change dirties the segment.
    pub fn set_mode(&mut self, mode: InterpolationMode) {
        if self.mode != mode {
            self.dirty = true;
        }
        self.mode = mode;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn export(&self) -> TrajectorySegment {
        self.clone()
    }
}

impl fmt::Display for TrajectorySegment {
    /// 1-based frame numbers, as shown to users.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start + 1, self.end + 1)
    }
}
