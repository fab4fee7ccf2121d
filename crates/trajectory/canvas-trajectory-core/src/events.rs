//! Semantic signals emitted by timeline operations.
//!
//! Timelines push events into their own outbox; hosts drain them with
//! [`Timeline::drain_events`](crate::timeline::Timeline::drain_events) and decide
//! whether to record, display or forward them.

use serde::{Deserialize, Serialize};

use crate::ids::CanvasId;
use crate::keyframe::{KeyframeProps, Prop};
use crate::point::PoseKind;
use crate::timeline::CanvasType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum TimelineEvent {
    KeyframeAdded {
        canvas: CanvasId,
        time: usize,
        props: KeyframeProps,
    },
    KeyframeRemoved {
        canvas: CanvasId,
        time: usize,
        props: Vec<Prop>,
    },
    TypeChanged {
        canvas: CanvasId,
        canvas_type: CanvasType,
    },
    TrajectoryInferred {
        canvas: CanvasId,
        request_id: u64,
    },
    /// Every frame became solved after at least one was pending.
    TrajectorySolved {
        canvas: CanvasId,
    },
    EstimationAborted {
        canvas: CanvasId,
    },
    InvariantViolated {
        canvas: CanvasId,
        partition: PoseKind,
        message: String,
    },
}
