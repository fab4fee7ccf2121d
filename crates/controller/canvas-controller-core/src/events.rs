//! Controller-level events, drained by hosts after each call.

use canvas_trajectory_core::{CanvasId, CanvasType, TimelineEvent};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ControllerEvent {
    CanvasCreated {
        canvas: CanvasId,
    },
    CanvasDeleted {
        canvas: CanvasId,
    },
    /// `None` when the selection was cleared.
    CanvasSelected {
        canvas: Option<CanvasId>,
    },
    CanvasTypeToggled {
        canvas: CanvasId,
        canvas_type: CanvasType,
    },
    SceneReset,
    SceneLoaded {
        canvases: usize,
    },
    ResponseRejected {
        canvas: Option<CanvasId>,
        reason: String,
    },
    SolverError {
        message: String,
    },
    Timeline(TimelineEvent),
}
