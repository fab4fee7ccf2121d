//! Error types for the trajectory core.

use thiserror::Error;

/// Structural problems in a segment partition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// A split point must lie in one segment (or two at a shared boundary).
    #[error("cannot split at frame {time}: contained by {containing} segments")]
    InvariantViolation { time: usize, containing: usize },

    #[error("frame {time} is not a segment boundary")]
    NotABoundary { time: usize },

    #[error("partition is empty")]
    Empty,

    #[error("segment [{start}, {end}] has start > end")]
    Inverted { start: usize, end: usize },

    #[error("partition starts at frame {start}, expected 0")]
    BadStart { start: usize },

    #[error("partition ends at frame {end}, expected {expected}")]
    BadEnd { end: usize, expected: usize },

    #[error("segment ending at {end} is followed by one starting at {next_start}")]
    Discontinuous { end: usize, next_start: usize },

    #[error("zero-length segment at frame {time} inside a multi-segment partition")]
    Degenerate { time: usize },
}

/// Errors returned by timeline edit operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimelineError {
    #[error("frame {time} is out of range for a trajectory of {len} frames")]
    FrameOutOfRange { time: usize, len: usize },

    #[error("a timeline needs at least one trajectory point")]
    EmptyTrajectory,
}

/// Errors produced while rebuilding a timeline from an export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("exported canvas has an empty trajectory")]
    EmptyTrajectory,

    #[error("keyframe at frame {time} is outside the {len}-frame trajectory")]
    KeyframeOutOfRange { time: usize, len: usize },

    #[error("invalid {which} partition: {source}")]
    Partition {
        which: &'static str,
        #[source]
        source: PartitionError,
    },
}
