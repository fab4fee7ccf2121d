//! Timeline: keyframes, the two segment partitions and the per-frame trajectory
//! of one animated canvas.
//!
//! Edits (`add_keyframe`, `remove_keyframe_props`, `set_type`) keep both
//! partitions a contiguous cover of the trajectory and mark the segments they
//! touch dirty. The reconciliation half (`infer_trajectory`,
//! `apply_inferred_trajectory`, `mark_trajectory_points`, `aborted_estimation`)
//! tracks what the external solver has confirmed.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{ImportError, PartitionError, TimelineError};
use crate::events::TimelineEvent;
use crate::export::{CanvasExport, TrajectorySnapshot};
use crate::frame::Clip;
use crate::ids::CanvasId;
use crate::keyframe::{Keyframe, KeyframeProps, Prop};
use crate::math::{Rotation, Vec2, Vec3};
use crate::partition::Partition;
use crate::point::{PoseKind, TrajectoryPoint};
use crate::segment::{InterpolationMode, TrajectorySegment};

/// Static canvases hold a single position anchor; dynamic ones follow a
/// keyframed and tracked path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasType {
    Static,
    Dynamic,
}

impl CanvasType {
    pub fn toggled(self) -> Self {
        match self {
            CanvasType::Static => CanvasType::Dynamic,
            CanvasType::Dynamic => CanvasType::Static,
        }
    }
}

fn is_keyframed(keyframes: &BTreeMap<usize, Keyframe>, time: usize, prop: Prop) -> bool {
    keyframes.get(&time).is_some_and(|kf| kf.has_property(prop))
}

/// The property whose keyframes pin a partition's boundaries.
fn anchor_prop(kind: PoseKind) -> Prop {
    match kind {
        PoseKind::Position => Prop::X,
        PoseKind::Orientation => Prop::Rot,
    }
}

#[derive(Debug)]
pub struct Timeline {
    id: CanvasId,
    keyframes: BTreeMap<usize, Keyframe>,
    position_segments: Partition,
    orientation_segments: Partition,
    trajectory: Vec<TrajectoryPoint>,
    canvas_type: CanvasType,
    up_to_date: bool,
    scale: f32,
    recenter: Vec2,
    /// Id of the most recent inference request; 0 before the first one.
    latest_request: u64,
    events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Create a timeline over `trajectory` with no keyframes and one clean,
    /// full-range tracking segment per partition.
    pub fn new(
        id: CanvasId,
        trajectory: Vec<TrajectoryPoint>,
        cfg: &Config,
    ) -> Result<Self, TimelineError> {
        if trajectory.is_empty() {
            return Err(TimelineError::EmptyTrajectory);
        }
        let len = trajectory.len();
        let mut timeline = Self {
            id,
            keyframes: BTreeMap::new(),
            position_segments: Partition::full(len, InterpolationMode::Tracking),
            orientation_segments: Partition::full(len, InterpolationMode::Tracking),
            trajectory,
            canvas_type: cfg.initial_type,
            up_to_date: true,
            scale: cfg.default_scale,
            recenter: cfg.recenter,
            latest_request: 0,
            events: Vec::new(),
        };
        timeline.up_to_date = timeline.all_solved();
        Ok(timeline)
    }

    /// Drop every keyframe and reset both partitions.
    fn init(&mut self) {
        let len = self.trajectory.len();
        self.keyframes.clear();
        self.position_segments = Partition::full(len, InterpolationMode::Tracking);
        self.orientation_segments = Partition::full(len, InterpolationMode::Tracking);
    }

    fn check_time(&self, time: usize) -> Result<(), TimelineError> {
        if time < self.trajectory.len() {
            Ok(())
        } else {
            Err(TimelineError::FrameOutOfRange {
                time,
                len: self.trajectory.len(),
            })
        }
    }

    fn partition_mut(&mut self, kind: PoseKind) -> &mut Partition {
        match kind {
            PoseKind::Position => &mut self.position_segments,
            PoseKind::Orientation => &mut self.orientation_segments,
        }
    }

    fn report_violation(&mut self, kind: PoseKind, err: PartitionError) {
        warn!("canvas {}: {kind:?} partition: {err}", self.id);
        self.events.push(TimelineEvent::InvariantViolated {
            canvas: self.id,
            partition: kind,
            message: err.to_string(),
        });
    }

    fn split(&mut self, kind: PoseKind, time: usize) {
        let result = self.partition_mut(kind).split_at(time);
        match result {
            Ok(outcome) => debug!("canvas {}: {kind:?} split at {time}: {outcome:?}", self.id),
            Err(err) => self.report_violation(kind, err),
        }
    }

    /// Merge at `time` and fall back to tracking when neither boundary of the
    /// result is still keyframed.
    fn merge(&mut self, kind: PoseKind, time: usize) {
        let outcome = match self.partition_mut(kind).merge_at(time) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report_violation(kind, err);
                return;
            }
        };
        let prop = anchor_prop(kind);
        let keyframes = &self.keyframes;
        let partition = match kind {
            PoseKind::Position => &mut self.position_segments,
            PoseKind::Orientation => &mut self.orientation_segments,
        };
        if let Some(seg) = partition.get_mut(outcome.index) {
            if !is_keyframed(keyframes, seg.start(), prop)
                && !is_keyframed(keyframes, seg.end(), prop)
            {
                seg.set_tracking();
            }
        }
    }

    // ----- edits -----

    /// Merge `props` into the keyframe at `time` (creating it if needed), update
    /// the partitions and write the resolved pose into the trajectory.
    pub fn add_keyframe(
        &mut self,
        clip: &dyn Clip,
        time: usize,
        props: KeyframeProps,
    ) -> Result<&Keyframe, TimelineError> {
        self.check_time(time)?;
        let props = props.clamped();

        self.keyframes
            .entry(time)
            .and_modify(|kf| kf.merge(&props))
            .or_insert_with(|| Keyframe::new(time, props.clone()));

        if self.canvas_type == CanvasType::Static && props.touches_position() {
            let others: Vec<usize> = self.keyframes.keys().copied().filter(|t| *t != time).collect();
            for t in others {
                self.remove_keyframe_props(t, &Prop::POSITION)?;
            }
        }

        if props.touches_position() {
            self.split(PoseKind::Position, time);
        }
        if props.touches_orientation() {
            self.split(PoseKind::Orientation, time);
        }

        self.resolve_keyframe_pose(clip, time, &props);

        self.events.push(TimelineEvent::KeyframeAdded {
            canvas: self.id,
            time,
            props,
        });
        self.refresh_up_to_date();

        Ok(&self.keyframes[&time])
    }

    fn resolve_keyframe_pose(&mut self, clip: &dyn Clip, time: usize, props: &KeyframeProps) {
        let point = &mut self.trajectory[time];

        if let Some(rot) = props.rot {
            point.rotation = rot;
            point.rotation_solved = true;
        }

        let (Some(x), Some(y)) = (props.x, props.y) else {
            return;
        };
        let Some(frame) = clip.frame(time) else {
            warn!(
                "canvas {}: clip '{}' has no frame {time}; keyframe position not resolved",
                self.id,
                clip.name()
            );
            return;
        };
        let depth = props
            .depth
            .unwrap_or_else(|| frame.get_depth(point.position));
        point.position = frame.screen_space_to_world_space(x, y, depth);
        point.position_solved = true;
    }

    /// Remove properties from the keyframe at `time`, merging segments whose
    /// shared boundary is no longer constrained. Removing `x` also removes
    /// `depth`. Returns whether anything was removed.
    pub fn remove_keyframe_props(
        &mut self,
        time: usize,
        props: &[Prop],
    ) -> Result<bool, TimelineError> {
        self.check_time(time)?;

        let mut props: Vec<Prop> = props.to_vec();
        if props.contains(&Prop::X) && !props.contains(&Prop::Depth) {
            props.push(Prop::Depth);
        }

        let last_keyframe = self.keyframes.len() == 1;
        let Some(kf) = self.keyframes.get_mut(&time) else {
            return Ok(false);
        };

        if last_keyframe && props.iter().any(|p| matches!(p, Prop::X | Prop::Y)) {
            warn!(
                "canvas {}: refusing to remove the last position keyframe",
                self.id
            );
            props.retain(|p| !matches!(p, Prop::X | Prop::Y));
        }

        let mut removed: Vec<Prop> = Vec::with_capacity(props.len());
        for p in &props {
            if kf.remove_property(*p) && !removed.contains(p) {
                removed.push(*p);
            }
        }
        let has_x = kf.has_property(Prop::X);
        let has_depth = kf.has_property(Prop::Depth);
        let now_empty = kf.is_empty();

        if removed.is_empty() {
            return Ok(false);
        }

        let was_removed = |p: Prop| removed.contains(&p);
        if was_removed(Prop::X) && was_removed(Prop::Y) && !has_depth {
            self.merge(PoseKind::Position, time);
        } else if was_removed(Prop::Depth) {
            if !has_x {
                self.merge(PoseKind::Position, time);
            } else {
                self.position_segments.mark_adjacent_dirty(time);
            }
        }
        if was_removed(Prop::Rot) {
            self.merge(PoseKind::Orientation, time);
        }

        self.events.push(TimelineEvent::KeyframeRemoved {
            canvas: self.id,
            time,
            props: removed,
        });

        if now_empty {
            self.keyframes.remove(&time);
        }
        Ok(true)
    }

    /// Delete the keyframe at `time` outright, without touching the partitions.
    pub fn clear_keyframe(&mut self, time: usize) -> Option<Keyframe> {
        self.keyframes.remove(&time)
    }

    /// Switch between static and dynamic.
    ///
    /// Entering static discards all keyframes and segments and re-installs one
    /// position keyframe at the recenter anchor on `playhead`. Any other call
    /// marks every segment of both partitions dirty.
    pub fn set_type(
        &mut self,
        clip: &dyn Clip,
        playhead: usize,
        canvas_type: CanvasType,
    ) -> Result<(), TimelineError> {
        if self.canvas_type != canvas_type {
            if canvas_type == CanvasType::Static {
                self.check_time(playhead)?;
            }
            self.events.push(TimelineEvent::TypeChanged {
                canvas: self.id,
                canvas_type,
            });
            if canvas_type == CanvasType::Static {
                self.init();
                self.canvas_type = canvas_type;
                let anchor = KeyframeProps::xy(self.recenter.x, self.recenter.y);
                self.add_keyframe(clip, playhead, anchor)?;
                return Ok(());
            }
        }

        self.canvas_type = canvas_type;
        self.position_segments.mark_all_dirty();
        self.orientation_segments.mark_all_dirty();
        Ok(())
    }

    /// Set the interpolation mode of the segment holding `time` (the left one
    /// at a shared boundary). The segment is dirtied only if its mode changes;
    /// returns whether it did.
    pub fn set_segment_mode(
        &mut self,
        kind: PoseKind,
        time: usize,
        mode: InterpolationMode,
    ) -> Result<bool, TimelineError> {
        self.check_time(time)?;
        let (id, len) = (self.id, self.trajectory.len());
        let Some(seg) = self.partition_mut(kind).segment_at_mut(time) else {
            return Err(TimelineError::FrameOutOfRange { time, len });
        };
        let changed = seg.mode() != mode;
        seg.set_mode(mode);
        if changed {
            debug!("canvas {id}: {kind:?} segment {seg} set to {mode:?}");
        }
        Ok(changed)
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Offset every trajectory position by a world-space vector.
    pub fn translate(&mut self, offset: Vec3) {
        for point in &mut self.trajectory {
            point.position += offset;
        }
    }

    // ----- solver reconciliation -----

    /// Snapshot keyframes and partitions for the solver and mark every frame
    /// pending.
    pub fn infer_trajectory(&mut self) -> TrajectorySnapshot {
        self.latest_request += 1;
        let mut snapshot = self.export_keyframes();
        snapshot.request_id = Some(self.latest_request);

        self.events.push(TimelineEvent::TrajectoryInferred {
            canvas: self.id,
            request_id: self.latest_request,
        });
        self.mark_trajectory_points(Some(false), Some(false), None);
        snapshot
    }

    /// Keyframes and partitions without issuing a request.
    pub fn export_keyframes(&self) -> TrajectorySnapshot {
        TrajectorySnapshot {
            canvas_id: self.id,
            request_id: None,
            keyframes: self.keyframes().cloned().collect(),
            position_segments: self.position_segments.export(),
            orientation_segments: self.orientation_segments.export(),
            canvas_type: self.canvas_type,
        }
    }

    /// Whether a response tagged with `request_id` predates the latest request.
    pub fn is_stale(&self, request_id: Option<u64>) -> bool {
        matches!(request_id, Some(id) if id < self.latest_request)
    }

    #[inline]
    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// Overwrite solved poses. `positions`/`rotations` are parallel to
    /// `indices`; each written frame is flagged solved and the segments of the
    /// matching partition containing it are marked clean.
    pub fn apply_inferred_trajectory(
        &mut self,
        positions: Option<&[Vec3]>,
        rotations: Option<&[Rotation]>,
        indices: &[usize],
    ) {
        let len = self.trajectory.len();
        for (i, &frame) in indices.iter().enumerate() {
            if frame >= len {
                warn!(
                    "canvas {}: solver result for frame {frame} outside {len}-frame trajectory",
                    self.id
                );
                continue;
            }
            if let Some(position) = positions.and_then(|p| p.get(i)) {
                let point = &mut self.trajectory[frame];
                point.position = *position;
                point.position_solved = true;
                self.position_segments.mark_clean_containing(frame);
            }
            if let Some(rotation) = rotations.and_then(|r| r.get(i)) {
                let point = &mut self.trajectory[frame];
                point.rotation = *rotation;
                point.rotation_solved = true;
                self.orientation_segments.mark_clean_containing(frame);
            }
        }
        self.refresh_up_to_date();
    }

    /// Set solved flags without touching poses or segments. `None` leaves that
    /// flag alone; `indices: None` means every frame.
    pub fn mark_trajectory_points(
        &mut self,
        position_solved: Option<bool>,
        rotation_solved: Option<bool>,
        indices: Option<&[usize]>,
    ) {
        let apply = |point: &mut TrajectoryPoint| {
            if let Some(v) = position_solved {
                point.position_solved = v;
            }
            if let Some(v) = rotation_solved {
                point.rotation_solved = v;
            }
        };
        match indices {
            None => self.trajectory.iter_mut().for_each(apply),
            Some(indices) => {
                for &frame in indices {
                    match self.trajectory.get_mut(frame) {
                        Some(point) => apply(point),
                        None => warn!("canvas {}: cannot mark frame {frame}", self.id),
                    }
                }
            }
        }
        self.refresh_up_to_date();
    }

    /// Give up on the in-flight estimation: report up to date and mark every
    /// segment clean, leaving poses and solved flags as they are.
    pub fn aborted_estimation(&mut self) {
        self.up_to_date = true;
        self.position_segments.mark_all_clean();
        self.orientation_segments.mark_all_clean();
        self.events
            .push(TimelineEvent::EstimationAborted { canvas: self.id });
    }

    fn all_solved(&self) -> bool {
        self.trajectory.iter().all(TrajectoryPoint::solved)
    }

    fn refresh_up_to_date(&mut self) {
        let now = self.all_solved();
        if !self.up_to_date && now {
            info!("canvas {}: trajectory solved", self.id);
            self.events
                .push(TimelineEvent::TrajectorySolved { canvas: self.id });
        }
        self.up_to_date = now;
    }

    // ----- queries -----

    #[inline]
    pub fn id(&self) -> CanvasId {
        self.id
    }

    #[inline]
    pub fn canvas_type(&self) -> CanvasType {
        self.canvas_type
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    pub fn trajectory(&self) -> &[TrajectoryPoint] {
        &self.trajectory
    }

    pub fn position_segments(&self) -> &Partition {
        &self.position_segments
    }

    pub fn orientation_segments(&self) -> &Partition {
        &self.orientation_segments
    }

    pub fn partition(&self, kind: PoseKind) -> &Partition {
        match kind {
            PoseKind::Position => &self.position_segments,
            PoseKind::Orientation => &self.orientation_segments,
        }
    }

    /// Keyframes in time order.
    pub fn keyframes(&self) -> impl Iterator<Item = &Keyframe> {
        self.keyframes.values()
    }

    pub fn keyframe(&self, time: usize) -> Option<&Keyframe> {
        self.keyframes.get(&time)
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_keyframed(&self, time: usize, prop: Prop) -> bool {
        is_keyframed(&self.keyframes, time, prop)
    }

    /// Number of keyframes holding any of x, y or depth.
    pub fn position_keyframe_count(&self) -> usize {
        self.keyframes
            .values()
            .filter(|kf| kf.props().touches_position())
            .count()
    }

    /// Segments with at least one boundary keyframed for `prop`.
    pub fn keyframed_segments(&self, kind: PoseKind, prop: Prop) -> Vec<&TrajectorySegment> {
        self.partition(kind)
            .iter()
            .filter(|s| self.is_keyframed(s.start(), prop) || self.is_keyframed(s.end(), prop))
            .collect()
    }

    fn constrained_segment(&self, kind: PoseKind, time: usize) -> Option<&TrajectorySegment> {
        let prop = anchor_prop(kind);
        self.partition(kind)
            .segment_at(time)
            .filter(|s| self.is_keyframed(s.start(), prop) || self.is_keyframed(s.end(), prop))
    }

    /// Position segment containing `time`, if one of its boundaries is keyframed.
    pub fn get_position_segment(&self, time: usize) -> Option<&TrajectorySegment> {
        self.constrained_segment(PoseKind::Position, time)
    }

    /// Orientation segment containing `time`, if one of its boundaries is keyframed.
    pub fn get_orientation_segment(&self, time: usize) -> Option<&TrajectorySegment> {
        self.constrained_segment(PoseKind::Orientation, time)
    }

    /// Whether any keyframed segment still needs solving.
    pub fn has_dirty_segments(&self) -> bool {
        self.keyframed_segments(PoseKind::Position, Prop::X)
            .iter()
            .any(|s| s.is_dirty())
            || self
                .keyframed_segments(PoseKind::Orientation, Prop::Rot)
                .iter()
                .any(|s| s.is_dirty())
    }

    pub fn get_position(&self, time: usize) -> Option<Vec3> {
        self.trajectory.get(time).map(|p| p.position)
    }

    pub fn get_rotation(&self, time: usize) -> Option<Rotation> {
        self.trajectory.get(time).map(|p| p.rotation)
    }

    /// Depth of the canvas at `time` as seen from that frame.
    pub fn get_depth(&self, clip: &dyn Clip, time: usize) -> Option<f32> {
        let frame = clip.frame(time)?;
        Some(frame.get_depth(self.get_position(time)?))
    }

    pub fn get_projected_depth(&self, clip: &dyn Clip, time: usize) -> Option<f32> {
        self.get_depth(clip, time)
    }

    /// Screen position of the canvas at `time`, optionally clamped on screen.
    pub fn get_projected_position(&self, clip: &dyn Clip, time: usize, clamp: bool) -> Option<Vec2> {
        let frame = clip.frame(time)?;
        let pos = frame.project(self.get_position(time)?);
        Some(if clamp { pos.clamped() } else { pos })
    }

    /// Rotation at `time` expressed in that frame's camera space.
    pub fn get_projected_rotation(&self, clip: &dyn Clip, time: usize) -> Option<Rotation> {
        let frame = clip.frame(time)?;
        Some(frame.convert_to_local_rotation(&self.get_rotation(time)?))
    }

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    // ----- export / import -----

    pub fn export(&self) -> CanvasExport {
        CanvasExport {
            canvas_id: self.id,
            trajectory: self.trajectory.iter().map(TrajectoryPoint::export).collect(),
            scale: self.scale,
            keyframes: self.keyframes().cloned().collect(),
            position_segments: self.position_segments.export(),
            orientation_segments: self.orientation_segments.export(),
            canvas_type: self.canvas_type,
        }
    }

    /// Rebuild a timeline from its export. Partitions come straight from the
    /// serialized segment lists and keyframes are re-keyed by their time.
    pub fn from_export(export: CanvasExport, cfg: &Config) -> Result<Self, ImportError> {
        let len = export.trajectory.len();
        if len == 0 {
            return Err(ImportError::EmptyTrajectory);
        }

        let position_segments = Partition::from_segments(export.position_segments, len)
            .map_err(|source| ImportError::Partition {
                which: "position",
                source,
            })?;
        let orientation_segments = Partition::from_segments(export.orientation_segments, len)
            .map_err(|source| ImportError::Partition {
                which: "orientation",
                source,
            })?;

        let mut keyframes = BTreeMap::new();
        for kf in export.keyframes {
            if kf.time >= len {
                return Err(ImportError::KeyframeOutOfRange { time: kf.time, len });
            }
            let kf = Keyframe::new(kf.time, kf.props().clone());
            if !kf.is_empty() {
                keyframes.insert(kf.time, kf);
            }
        }

        Ok(Self {
            id: export.canvas_id,
            keyframes,
            position_segments,
            orientation_segments,
            trajectory: export.trajectory.into_iter().map(TrajectoryPoint::from).collect(),
            canvas_type: export.canvas_type,
            up_to_date: true,
            scale: export.scale,
            recenter: cfg.recenter,
            latest_request: 0,
            events: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::OrthoClip;

    fn dynamic(len: usize) -> (Timeline, OrthoClip) {
        let cfg = Config {
            initial_type: CanvasType::Dynamic,
            ..Config::default()
        };
        let traj = vec![TrajectoryPoint::new(Vec3::ZERO, Rotation::IDENTITY); len];
        (
            Timeline::new(CanvasId(0), traj, &cfg).unwrap(),
            OrthoClip::still("clip", len),
        )
    }

    #[test]
    fn empty_trajectory_is_rejected() {
        let err = Timeline::new(CanvasId(0), Vec::new(), &Config::default()).unwrap_err();
        assert_eq!(err, TimelineError::EmptyTrajectory);
    }

    #[test]
    fn out_of_range_edit_is_an_error() {
        let (mut tl, clip) = dynamic(3);
        assert!(matches!(
            tl.add_keyframe(&clip, 3, KeyframeProps::xy(0.5, 0.5)),
            Err(TimelineError::FrameOutOfRange { time: 3, len: 3 })
        ));
        assert_eq!(tl.keyframe_count(), 0);
    }

    #[test]
    fn rotation_keyframe_writes_pose_and_splits_orientation_only() {
        let (mut tl, clip) = dynamic(6);
        let rot = Rotation::from_row_major_3x3([0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        tl.add_keyframe(&clip, 2, KeyframeProps::new().with_rot(rot))
            .unwrap();
        assert_eq!(tl.get_rotation(2), Some(rot));
        assert_eq!(tl.orientation_segments().len(), 2);
        assert_eq!(tl.position_segments().len(), 1);
        assert!(!tl.position_segments().has_dirty());
    }

    #[test]
    fn depth_only_removal_keeps_split_when_x_remains() {
        let (mut tl, clip) = dynamic(6);
        tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
        tl.add_keyframe(&clip, 3, KeyframeProps::xy(0.2, 0.2).with_depth(2.0))
            .unwrap();
        tl.position_segments.mark_all_clean();

        assert!(tl.remove_keyframe_props(3, &[Prop::Depth]).unwrap());
        assert_eq!(tl.position_segments().len(), 2);
        assert!(tl.position_segments().iter().all(|s| s.is_dirty()));
    }

    #[test]
    fn stale_request_ids_are_detected() {
        let (mut tl, _clip) = dynamic(2);
        assert!(!tl.is_stale(Some(0)));
        tl.infer_trajectory();
        tl.infer_trajectory();
        assert!(tl.is_stale(Some(1)));
        assert!(!tl.is_stale(Some(2)));
        assert!(!tl.is_stale(None));
    }
}
