//! Canvas Controller Core
//!
//! Session-level registry over canvas timelines plus the solver protocol:
//! requests leave through an injected [`SolverPort`], responses come back as
//! raw messages via [`AnimationController::handle_message`] or decoded values
//! via [`AnimationController::apply`].

pub mod controller;
pub mod error;
pub mod events;
pub mod port;
pub mod protocol;
pub mod scene;

pub use controller::{AnimationController, Disposition};
pub use error::{ControllerError, PortError, ProtocolError};
pub use events::ControllerEvent;
pub use port::{Outbox, SolverPort, WriterPort};
pub use protocol::{
    parse_message, FrameSet, OrientationResult, PositionResult, SolveRequest, SolverRequest,
    SolverResponse,
};
pub use scene::SceneExport;
