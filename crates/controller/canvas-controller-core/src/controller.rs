//! Registry of animated canvases.
//!
//! [`AnimationController`] owns every [`Timeline`] of a session keyed by
//! [`CanvasId`], tracks the selection and playhead, sends solver requests
//! through the injected [`SolverPort`] and routes solver responses back to the
//! timeline they name.

use canvas_trajectory_core::{
    CanvasId, CanvasType, Clip, Config, IdAllocator, Keyframe, KeyframeProps, Prop, Rotation,
    Timeline, TrajectoryPoint, TrajectorySnapshot, Vec3,
};
use hashbrown::HashMap;
use log::{error, info, warn};

use crate::error::{ControllerError, ProtocolError};
use crate::events::ControllerEvent;
use crate::port::SolverPort;
use crate::protocol::{parse_message, SolveRequest, SolverRequest, SolverResponse};
use crate::scene::SceneExport;

/// What happened to a solver response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Routed to a canvas and applied.
    Applied,
    /// Informational status (`ERROR`, `VIDEO_LIST`) recorded on the controller.
    Recorded,
    /// Answers a request older than the canvas's latest one.
    Stale,
    /// Names a canvas that does not exist (deleted since the request).
    UnknownCanvas,
}

#[derive(Debug)]
pub struct AnimationController<P: SolverPort> {
    cfg: Config,
    clip: Box<dyn Clip>,
    port: P,
    canvases: HashMap<CanvasId, Timeline>,
    selected: Option<CanvasId>,
    ids: IdAllocator,
    /// Playhead frame.
    time: usize,
    available_clips: Vec<String>,
    events: Vec<ControllerEvent>,
}

impl<P: SolverPort> AnimationController<P> {
    pub fn new(cfg: Config, clip: Box<dyn Clip>, port: P) -> Self {
        Self {
            cfg,
            clip,
            port,
            canvases: HashMap::new(),
            selected: None,
            ids: IdAllocator::new(),
            time: 0,
            available_clips: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn clip(&self) -> &dyn Clip {
        self.clip.as_ref()
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    #[inline]
    pub fn time(&self) -> usize {
        self.time
    }

    /// Move the playhead.
    pub fn set_time(&mut self, time: usize) -> Result<(), ControllerError> {
        let len = self.clip.frame_count();
        if time >= len {
            return Err(ControllerError::NoFrame { time, len });
        }
        self.time = time;
        Ok(())
    }

    /// Clips the solver reported as available.
    pub fn available_clips(&self) -> &[String] {
        &self.available_clips
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move a timeline's pending events into the controller outbox.
    fn absorb(&mut self, id: CanvasId) {
        if let Some(tl) = self.canvases.get_mut(&id) {
            self.events
                .extend(tl.drain_events().into_iter().map(ControllerEvent::Timeline));
        }
    }

    // ----- registry -----

    /// Drop every canvas, restart id allocation and tell the solver to forget
    /// its per-canvas state.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.canvases.clear();
        self.ids.reset();
        self.selected = None;
        self.events.push(ControllerEvent::SceneReset);
        info!("scene reset");
        self.port.send(SolverRequest::InitState)?;
        Ok(())
    }

    /// Create a canvas at the recenter anchor of the playhead frame, keyframe it
    /// there and select it.
    pub fn add_canvas(&mut self) -> Result<CanvasId, ControllerError> {
        let len = self.clip.frame_count();
        let frame = self
            .clip
            .frame(self.time)
            .ok_or(ControllerError::NoFrame {
                time: self.time,
                len,
            })?;
        let anchor = self.cfg.recenter;
        let position = frame.screen_space_to_world_space(anchor.x, anchor.y, self.cfg.default_depth);
        let trajectory = vec![TrajectoryPoint::new(position, Rotation::IDENTITY); len];

        let id = self.ids.alloc_canvas();
        let mut timeline = Timeline::new(id, trajectory, &self.cfg)?;
        timeline.add_keyframe(self.clip.as_ref(), self.time, KeyframeProps::xy(anchor.x, anchor.y))?;
        self.canvases.insert(id, timeline);

        info!("canvas {id} created at frame {}", self.time);
        self.events.push(ControllerEvent::CanvasCreated { canvas: id });
        self.absorb(id);
        self.select_canvas(id);
        Ok(id)
    }

    /// Returns whether the canvas existed.
    pub fn delete_canvas(&mut self, id: CanvasId) -> bool {
        self.absorb(id);
        if self.canvases.remove(&id).is_none() {
            return false;
        }
        info!("canvas {id} deleted");
        self.events.push(ControllerEvent::CanvasDeleted { canvas: id });
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    pub fn delete_selected_canvas(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete_canvas(id),
            None => false,
        }
    }

    /// Select `id`, clearing any other selection. Unknown ids are refused.
    pub fn select_canvas(&mut self, id: CanvasId) -> bool {
        if !self.canvases.contains_key(&id) {
            return false;
        }
        self.selected = Some(id);
        self.events
            .push(ControllerEvent::CanvasSelected { canvas: Some(id) });
        true
    }

    pub fn unselect_all(&mut self) {
        if self.selected.take().is_some() {
            self.events
                .push(ControllerEvent::CanvasSelected { canvas: None });
        }
    }

    pub fn selected_canvas_id(&self) -> Option<CanvasId> {
        self.selected
    }

    pub fn selected_canvas(&self) -> Option<&Timeline> {
        self.selected.and_then(|id| self.canvases.get(&id))
    }

    pub fn canvas(&self, id: CanvasId) -> Option<&Timeline> {
        self.canvases.get(&id)
    }

    /// Canvas ids in ascending order.
    pub fn canvas_ids(&self) -> Vec<CanvasId> {
        let mut ids: Vec<_> = self.canvases.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    fn timeline_mut(&mut self, id: CanvasId) -> Result<&mut Timeline, ControllerError> {
        self.canvases
            .get_mut(&id)
            .ok_or(ControllerError::UnknownCanvas(id))
    }

    // ----- edits -----

    pub fn add_keyframe(
        &mut self,
        id: CanvasId,
        time: usize,
        props: KeyframeProps,
    ) -> Result<Keyframe, ControllerError> {
        let tl = self
            .canvases
            .get_mut(&id)
            .ok_or(ControllerError::UnknownCanvas(id))?;
        let kf = tl.add_keyframe(self.clip.as_ref(), time, props)?.clone();
        self.absorb(id);
        Ok(kf)
    }

    pub fn remove_keyframe_props(
        &mut self,
        id: CanvasId,
        time: usize,
        props: &[Prop],
    ) -> Result<bool, ControllerError> {
        let removed = self.timeline_mut(id)?.remove_keyframe_props(time, props)?;
        self.absorb(id);
        Ok(removed)
    }

    /// Flip the selected canvas between static and dynamic, re-centering on
    /// the playhead when it becomes static. Returns the new type.
    pub fn toggle_type(&mut self) -> Result<Option<CanvasType>, ControllerError> {
        let Some(id) = self.selected else {
            return Ok(None);
        };
        let tl = self
            .canvases
            .get_mut(&id)
            .ok_or(ControllerError::UnknownCanvas(id))?;
        let canvas_type = tl.canvas_type().toggled();
        tl.set_type(self.clip.as_ref(), self.time, canvas_type)?;
        self.events.push(ControllerEvent::CanvasTypeToggled {
            canvas: id,
            canvas_type,
        });
        self.absorb(id);
        Ok(Some(canvas_type))
    }

    /// Offset the whole trajectory of the selected canvas.
    pub fn translate(&mut self, offset: Vec3) -> bool {
        match self.selected.and_then(|id| self.canvases.get_mut(&id)) {
            Some(tl) => {
                tl.translate(offset);
                true
            }
            None => false,
        }
    }

    // ----- solver requests -----

    fn solve_request(&self, snapshot: TrajectorySnapshot) -> SolveRequest {
        SolveRequest {
            snapshot,
            clip: self.clip.name().to_owned(),
        }
    }

    /// Send the canvas to the solver. If the port refuses, the estimation is
    /// aborted locally so the canvas does not stay pending.
    pub fn infer_trajectory(&mut self, id: CanvasId) -> Result<u64, ControllerError> {
        let snapshot = self.timeline_mut(id)?.infer_trajectory();
        let request_id = snapshot.request_id.unwrap_or_default();
        let request = SolverRequest::InferTrajectory(self.solve_request(snapshot));

        if let Err(err) = self.port.send(request) {
            warn!("canvas {id}: solver request failed: {err}");
            self.aborted_estimation(id);
            return Err(err.into());
        }
        self.absorb(id);
        Ok(request_id)
    }

    pub fn export_keyframes(&mut self, id: CanvasId) -> Result<(), ControllerError> {
        let snapshot = self.timeline_mut(id)?.export_keyframes();
        let request = SolverRequest::ExportKeyframes(self.solve_request(snapshot));
        self.port.send(request)?;
        Ok(())
    }

    pub fn add_keyframe_and_infer(
        &mut self,
        id: CanvasId,
        time: usize,
        props: KeyframeProps,
    ) -> Result<u64, ControllerError> {
        self.add_keyframe(id, time, props)?;
        self.infer_trajectory(id)
    }

    // ----- solver responses -----

    /// Overwrite solved poses of a canvas. Returns whether the canvas exists.
    pub fn set_trajectory(
        &mut self,
        id: CanvasId,
        positions: Option<&[Vec3]>,
        rotations: Option<&[Rotation]>,
        indices: &[usize],
    ) -> bool {
        let Some(tl) = self.canvases.get_mut(&id) else {
            warn!("solver result for unknown canvas {id}");
            return false;
        };
        tl.apply_inferred_trajectory(positions, rotations, indices);
        self.absorb(id);
        true
    }

    pub fn mark_trajectory_points(
        &mut self,
        id: CanvasId,
        indices: &[usize],
        position_solved: Option<bool>,
        rotation_solved: Option<bool>,
    ) -> bool {
        let Some(tl) = self.canvases.get_mut(&id) else {
            warn!("solver result for unknown canvas {id}");
            return false;
        };
        tl.mark_trajectory_points(position_solved, rotation_solved, Some(indices));
        self.absorb(id);
        true
    }

    pub fn aborted_estimation(&mut self, id: CanvasId) -> bool {
        let Some(tl) = self.canvases.get_mut(&id) else {
            warn!("abort for unknown canvas {id}");
            return false;
        };
        tl.aborted_estimation();
        self.absorb(id);
        true
    }

    /// Decode and route one raw solver message.
    ///
    /// A message that fails to decode but names a canvas aborts that canvas's
    /// estimation; the decode error is still returned.
    pub fn handle_message(&mut self, text: &str) -> Result<Disposition, ProtocolError> {
        match parse_message(text) {
            Ok(response) => Ok(self.apply(response)),
            Err(err) => {
                warn!("rejected solver message: {err}");
                let canvas = err.canvas();
                if let Some(id) = canvas {
                    self.aborted_estimation(id);
                }
                self.events.push(ControllerEvent::ResponseRejected {
                    canvas,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Route a decoded response.
    pub fn apply(&mut self, response: SolverResponse) -> Disposition {
        let id = match &response {
            SolverResponse::Error { message } => {
                error!("solver error: {message}");
                self.events.push(ControllerEvent::SolverError {
                    message: message.clone(),
                });
                return Disposition::Recorded;
            }
            SolverResponse::VideoList { videos, .. } => {
                info!("solver offers {} clips", videos.len());
                self.available_clips = videos.clone();
                return Disposition::Recorded;
            }
            other => match other.canvas() {
                Some(id) => id,
                None => return Disposition::Recorded,
            },
        };

        let Some(tl) = self.canvases.get(&id) else {
            warn!("{} for unknown canvas {id}", response.status());
            return Disposition::UnknownCanvas;
        };
        if tl.is_stale(response.request_id()) {
            let reason = format!(
                "{} answers request {:?}, latest is {}",
                response.status(),
                response.request_id(),
                tl.latest_request()
            );
            warn!("canvas {id}: dropping stale response: {reason}");
            self.events.push(ControllerEvent::ResponseRejected {
                canvas: Some(id),
                reason,
            });
            return Disposition::Stale;
        }

        match response {
            SolverResponse::PositionSuccess(r) => {
                let positions = r.positions();
                self.set_trajectory(id, Some(&positions), None, &r.frame_indices);
            }
            SolverResponse::OrientationSuccess(r) => {
                let rotations = r.rotations();
                self.set_trajectory(id, None, Some(&rotations), &r.frame_indices);
            }
            SolverResponse::PositionUnchanged(f) => {
                self.mark_trajectory_points(id, &f.frame_indices, Some(true), None);
            }
            SolverResponse::OrientationUnchanged(f) => {
                self.mark_trajectory_points(id, &f.frame_indices, None, Some(true));
            }
            SolverResponse::Failure(_) => {
                self.aborted_estimation(id);
            }
            SolverResponse::Error { .. } | SolverResponse::VideoList { .. } => {}
        }
        Disposition::Applied
    }

    // ----- scene export / import -----

    pub fn export_scene(&self) -> SceneExport {
        SceneExport {
            canvases: self
                .canvas_ids()
                .into_iter()
                .filter_map(|id| self.canvases.get(&id))
                .map(Timeline::export)
                .collect(),
            clip: self.clip.name().to_owned(),
        }
    }

    /// Add the canvases of an exported scene. Nothing is inserted unless every
    /// canvas imports cleanly. Returns the number of canvases loaded.
    pub fn load_exported_scene(&mut self, scene: SceneExport) -> Result<usize, ControllerError> {
        if scene.clip != self.clip.name() {
            warn!(
                "scene was authored on clip '{}', current clip is '{}'",
                scene.clip,
                self.clip.name()
            );
        }

        let mut timelines = Vec::with_capacity(scene.canvases.len());
        for export in scene.canvases {
            let canvas = export.canvas_id;
            if export.trajectory.len() != self.clip.frame_count() {
                warn!(
                    "canvas {canvas}: {} trajectory points for a {}-frame clip",
                    export.trajectory.len(),
                    self.clip.frame_count()
                );
            }
            let timeline = Timeline::from_export(export, &self.cfg)
                .map_err(|source| ControllerError::Import { canvas, source })?;
            timelines.push(timeline);
        }

        let loaded = timelines.len();
        for timeline in timelines {
            let id = timeline.id();
            self.ids.reserve_past(id);
            if self.canvases.insert(id, timeline).is_some() {
                warn!("canvas {id} replaced by imported scene");
            }
        }
        info!("loaded {loaded} canvases");
        self.events
            .push(ControllerEvent::SceneLoaded { canvases: loaded });
        Ok(loaded)
    }
}
