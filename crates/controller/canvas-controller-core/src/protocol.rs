//! Solver wire protocol.
//!
//! Requests carry an `action` tag and responses a `status` tag, both in
//! SCREAMING_SNAKE_CASE. Estimation responses are scoped to one canvas and a
//! list of frame indices; `positions`/`orientations` are parallel to
//! `frameIndices`, not sorted by frame.

use canvas_trajectory_core::{CanvasId, Rotation, TrajectorySnapshot, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ProtocolError;

/// Keyframes and partitions of one canvas plus the clip they refer to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(flatten)]
    pub snapshot: TrajectorySnapshot,
    pub clip: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverRequest {
    /// Dump only; no response expected.
    ExportKeyframes(SolveRequest),
    InferTrajectory(SolveRequest),
    /// The scene was reset; the solver drops all per-canvas state.
    InitState,
}

impl SolverRequest {
    pub fn canvas(&self) -> Option<CanvasId> {
        match self {
            SolverRequest::ExportKeyframes(r) | SolverRequest::InferTrajectory(r) => {
                Some(r.snapshot.canvas_id)
            }
            SolverRequest::InitState => None,
        }
    }
}

/// Frame indices a response applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSet {
    #[serde(rename = "canvasID")]
    pub canvas_id: CanvasId,
    #[serde(rename = "frameIndices")]
    pub frame_indices: Vec<usize>,
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionResult {
    #[serde(rename = "canvasID")]
    pub canvas_id: CanvasId,
    #[serde(rename = "frameIndices")]
    pub frame_indices: Vec<usize>,
    pub positions: Vec<[f32; 3]>,
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub message: String,
}

impl PositionResult {
    pub fn positions(&self) -> Vec<Vec3> {
        self.positions.iter().copied().map(Vec3::from).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationResult {
    #[serde(rename = "canvasID")]
    pub canvas_id: CanvasId,
    #[serde(rename = "frameIndices")]
    pub frame_indices: Vec<usize>,
    /// Row-major 3x3 (9 values) or column-major 4x4 (16 values) per frame.
    pub orientations: Vec<Vec<f32>>,
    #[serde(rename = "requestID", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub message: String,
}

impl OrientationResult {
    /// Decoded rotations; entries of an unsupported length are dropped, which
    /// [`parse_message`] has already rejected.
    pub fn rotations(&self) -> Vec<Rotation> {
        self.orientations
            .iter()
            .filter_map(|o| Rotation::from_wire(o))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SolverResponse {
    #[serde(rename = "ERROR")]
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(rename = "VIDEO_LIST")]
    VideoList {
        #[serde(default)]
        message: String,
        #[serde(rename = "videosList")]
        videos: Vec<String>,
    },
    #[serde(rename = "ESTIMATION_POSITION_SUCCESS")]
    PositionSuccess(PositionResult),
    #[serde(rename = "ESTIMATION_ORIENTATION_SUCCESS")]
    OrientationSuccess(OrientationResult),
    #[serde(rename = "ESTIMATION_POSITION_UNCHANGED")]
    PositionUnchanged(FrameSet),
    #[serde(rename = "ESTIMATION_ORIENTATION_UNCHANGED")]
    OrientationUnchanged(FrameSet),
    #[serde(rename = "ESTIMATION_FAILURE")]
    Failure(FrameSet),
}

/// Every status the solver may send.
pub const STATUSES: [&str; 7] = [
    "ERROR",
    "VIDEO_LIST",
    "ESTIMATION_POSITION_SUCCESS",
    "ESTIMATION_ORIENTATION_SUCCESS",
    "ESTIMATION_POSITION_UNCHANGED",
    "ESTIMATION_ORIENTATION_UNCHANGED",
    "ESTIMATION_FAILURE",
];

impl SolverResponse {
    pub fn status(&self) -> &'static str {
        match self {
            SolverResponse::Error { .. } => STATUSES[0],
            SolverResponse::VideoList { .. } => STATUSES[1],
            SolverResponse::PositionSuccess(_) => STATUSES[2],
            SolverResponse::OrientationSuccess(_) => STATUSES[3],
            SolverResponse::PositionUnchanged(_) => STATUSES[4],
            SolverResponse::OrientationUnchanged(_) => STATUSES[5],
            SolverResponse::Failure(_) => STATUSES[6],
        }
    }

    /// Canvas an estimation response is scoped to.
    pub fn canvas(&self) -> Option<CanvasId> {
        match self {
            SolverResponse::Error { .. } | SolverResponse::VideoList { .. } => None,
            SolverResponse::PositionSuccess(r) => Some(r.canvas_id),
            SolverResponse::OrientationSuccess(r) => Some(r.canvas_id),
            SolverResponse::PositionUnchanged(f)
            | SolverResponse::OrientationUnchanged(f)
            | SolverResponse::Failure(f) => Some(f.canvas_id),
        }
    }

    pub fn request_id(&self) -> Option<u64> {
        match self {
            SolverResponse::Error { .. } | SolverResponse::VideoList { .. } => None,
            SolverResponse::PositionSuccess(r) => r.request_id,
            SolverResponse::OrientationSuccess(r) => r.request_id,
            SolverResponse::PositionUnchanged(f)
            | SolverResponse::OrientationUnchanged(f)
            | SolverResponse::Failure(f) => f.request_id,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SolverResponse::Error { message } | SolverResponse::VideoList { message, .. } => {
                message
            }
            SolverResponse::PositionSuccess(r) => &r.message,
            SolverResponse::OrientationSuccess(r) => &r.message,
            SolverResponse::PositionUnchanged(f)
            | SolverResponse::OrientationUnchanged(f)
            | SolverResponse::Failure(f) => &f.message,
        }
    }

    /// Check the parallel arrays line up.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            SolverResponse::PositionSuccess(r) if r.positions.len() != r.frame_indices.len() => {
                Err(ProtocolError::LengthMismatch {
                    status: self.status(),
                    canvas: r.canvas_id,
                    values: r.positions.len(),
                    frames: r.frame_indices.len(),
                })
            }
            SolverResponse::OrientationSuccess(r) => {
                if r.orientations.len() != r.frame_indices.len() {
                    return Err(ProtocolError::LengthMismatch {
                        status: self.status(),
                        canvas: r.canvas_id,
                        values: r.orientations.len(),
                        frames: r.frame_indices.len(),
                    });
                }
                match r
                    .orientations
                    .iter()
                    .position(|o| !matches!(o.len(), 9 | 16))
                {
                    Some(index) => Err(ProtocolError::BadOrientation {
                        canvas: r.canvas_id,
                        index,
                        len: r.orientations[index].len(),
                    }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

fn canvas_field(value: &JsonValue) -> Option<CanvasId> {
    value
        .get("canvasID")
        .and_then(JsonValue::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(CanvasId)
}

/// Decode and validate one message from the solver.
///
/// Failures that still name a canvas report it through
/// [`ProtocolError::canvas`] so the caller can abort that canvas's estimation.
pub fn parse_message(text: &str) -> Result<SolverResponse, ProtocolError> {
    let value: JsonValue = serde_json::from_str(text).map_err(ProtocolError::Json)?;
    let status = value
        .get("status")
        .and_then(JsonValue::as_str)
        .ok_or(ProtocolError::MissingStatus)?
        .to_owned();
    if !STATUSES.contains(&status.as_str()) {
        return Err(ProtocolError::UnknownStatus(status));
    }

    let canvas = canvas_field(&value);
    let response: SolverResponse =
        serde_json::from_value(value).map_err(|source| ProtocolError::Malformed {
            status,
            canvas,
            source,
        })?;
    response.validate()?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_trajectory_core::CanvasType;
    use serde_json::json;

    #[test]
    fn init_state_is_a_bare_action() {
        let v = serde_json::to_value(SolverRequest::InitState).unwrap();
        assert_eq!(v, json!({"action": "INIT_STATE"}));
    }

    #[test]
    fn infer_request_flattens_snapshot() {
        let req = SolverRequest::InferTrajectory(SolveRequest {
            snapshot: TrajectorySnapshot {
                canvas_id: CanvasId(4),
                request_id: Some(2),
                keyframes: Vec::new(),
                position_segments: Vec::new(),
                orientation_segments: Vec::new(),
                canvas_type: CanvasType::Dynamic,
            },
            clip: "street".into(),
        });
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["action"], "INFER_TRAJECTORY");
        assert_eq!(v["canvasID"], 4);
        assert_eq!(v["requestID"], 2);
        assert_eq!(v["clip"], "street");
        assert_eq!(v["type"], "dynamic");
        assert!(v["positionSegments"].is_array());

        let back: SolverRequest = serde_json::from_value(v).unwrap();
        assert_eq!(back, req);
    }

    #[test]
    fn parses_position_success() {
        let resp = parse_message(
            r#"{"status":"ESTIMATION_POSITION_SUCCESS","message":"ok","canvasID":1,
                "positions":[[1,2,3],[4,5,6]],"frameIndices":[5,2]}"#,
        )
        .unwrap();
        let SolverResponse::PositionSuccess(r) = &resp else {
            panic!("unexpected {resp:?}");
        };
        assert_eq!(r.frame_indices, vec![5, 2]);
        assert_eq!(r.positions()[1], Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(resp.canvas(), Some(CanvasId(1)));
        assert_eq!(resp.request_id(), None);
        assert_eq!(resp.message(), "ok");
    }

    #[test]
    fn orientation_accepts_3x3_and_4x4() {
        let resp = parse_message(
            r#"{"status":"ESTIMATION_ORIENTATION_SUCCESS","canvasID":0,"frameIndices":[0,1],
                "orientations":[[1,0,0,0,1,0,0,0,1],
                                [1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,1]]}"#,
        )
        .unwrap();
        let SolverResponse::OrientationSuccess(r) = resp else {
            panic!("expected orientation success");
        };
        assert_eq!(r.rotations(), vec![Rotation::IDENTITY, Rotation::IDENTITY]);
    }

    #[test]
    fn missing_fields_name_the_canvas() {
        let err = parse_message(r#"{"status":"ESTIMATION_POSITION_SUCCESS","canvasID":3}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed { .. }));
        assert_eq!(err.canvas(), Some(CanvasId(3)));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = parse_message(
            r#"{"status":"ESTIMATION_POSITION_SUCCESS","canvasID":2,
                "positions":[[0,0,0]],"frameIndices":[0,1]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::LengthMismatch {
                values: 1,
                frames: 2,
                ..
            }
        ));

        let err = parse_message(
            r#"{"status":"ESTIMATION_ORIENTATION_SUCCESS","canvasID":2,
                "orientations":[[1,0,0]],"frameIndices":[0]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::BadOrientation { len: 3, .. }));
        assert_eq!(err.canvas(), Some(CanvasId(2)));
    }

    #[test]
    fn status_problems() {
        assert!(matches!(
            parse_message(r#"{"message":"hi"}"#),
            Err(ProtocolError::MissingStatus)
        ));
        assert!(matches!(
            parse_message(r#"{"status":"BOGUS"}"#),
            Err(ProtocolError::UnknownStatus(s)) if s == "BOGUS"
        ));
        assert!(matches!(parse_message("not json"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn video_list_and_error() {
        let resp = parse_message(
            r#"{"status":"VIDEO_LIST","message":"videos","videosList":["a","b"]}"#,
        )
        .unwrap();
        assert_eq!(
            resp,
            SolverResponse::VideoList {
                message: "videos".into(),
                videos: vec!["a".into(), "b".into()],
            }
        );
        let resp = parse_message(r#"{"status":"ERROR","message":"boom"}"#).unwrap();
        assert_eq!(resp.message(), "boom");
        assert_eq!(resp.canvas(), None);
    }
}
