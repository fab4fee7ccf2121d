//! Canvas Trajectory Core (engine-agnostic)
//!
//! Keyframe/segment timeline engine for flat canvases pinned to a moving point
//! in a video. Each canvas owns a [`Timeline`]: sparse keyframes, two segment
//! partitions (position and orientation) covering every frame, and the
//! per-frame trajectory an external solver fills in.

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod frame;
pub mod ids;
pub mod keyframe;
pub mod math;
pub mod partition;
pub mod point;
pub mod segment;
pub mod timeline;

pub use config::Config;
pub use error::{ImportError, PartitionError, TimelineError};
pub use events::TimelineEvent;
pub use export::{CanvasExport, TrajectorySnapshot};
pub use frame::{Clip, Frame, OrthoClip, OrthoFrame};
pub use ids::{CanvasId, IdAllocator};
pub use keyframe::{Keyframe, KeyframeProps, Prop, PropValue};
pub use math::{Rotation, Vec2, Vec3};
pub use partition::{MergeOutcome, Partition, SplitOutcome};
pub use point::{PointExport, PoseKind, TrajectoryPoint};
pub use segment::{InterpolationMode, SegmentId, TrajectorySegment};
pub use timeline::{CanvasType, Timeline};
