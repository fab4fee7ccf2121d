//! Error types for the canvas controller.

use canvas_trajectory_core::{CanvasId, ImportError, TimelineError};
use thiserror::Error;

/// Problems decoding a message received from the solver.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("solver message is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("solver message has no 'status' field")]
    MissingStatus,

    #[error("unknown solver status '{0}'")]
    UnknownStatus(String),

    /// Required fields for `status` were missing or had the wrong shape.
    #[error("malformed {status} response: {source}")]
    Malformed {
        status: String,
        canvas: Option<CanvasId>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{status} for canvas {canvas}: {values} values for {frames} frame indices")]
    LengthMismatch {
        status: &'static str,
        canvas: CanvasId,
        values: usize,
        frames: usize,
    },

    #[error("orientation {index} for canvas {canvas} has {len} elements, expected 9 or 16")]
    BadOrientation {
        canvas: CanvasId,
        index: usize,
        len: usize,
    },
}

impl ProtocolError {
    /// Canvas named by the offending message, when it could be read.
    pub fn canvas(&self) -> Option<CanvasId> {
        match self {
            ProtocolError::Malformed { canvas, .. } => *canvas,
            ProtocolError::LengthMismatch { canvas, .. }
            | ProtocolError::BadOrientation { canvas, .. } => Some(*canvas),
            ProtocolError::Json(_)
            | ProtocolError::MissingStatus
            | ProtocolError::UnknownStatus(_) => None,
        }
    }
}

/// The transport refused a request.
#[derive(Debug, Error)]
pub enum PortError {
    #[error("solver port is closed")]
    Closed,

    #[error("failed to encode solver request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write solver request: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error("no canvas with id {0}")]
    UnknownCanvas(CanvasId),

    #[error("clip has no frame {time} ({len} frames)")]
    NoFrame { time: usize, len: usize },

    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error("cannot import canvas {canvas}: {source}")]
    Import {
        canvas: CanvasId,
        #[source]
        source: ImportError,
    },

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
