use canvas_trajectory_core::{
    CanvasExport, CanvasId, CanvasType, Config, ImportError, KeyframeProps, OrthoClip,
    PartitionError, PoseKind, Prop, Rotation, Timeline, TimelineEvent, TrajectoryPoint, Vec3,
};
use serde_json::json;

fn dynamic_timeline(len: usize) -> (Timeline, OrthoClip) {
    let cfg = Config {
        initial_type: CanvasType::Dynamic,
        ..Config::default()
    };
    let trajectory = vec![TrajectoryPoint::new(Vec3::ZERO, Rotation::IDENTITY); len];
    (
        Timeline::new(CanvasId(7), trajectory, &cfg).unwrap(),
        OrthoClip::still("clip", len),
    )
}

fn solved_positions(tl: &Timeline) -> Vec<bool> {
    tl.trajectory().iter().map(|p| p.position_solved).collect()
}

#[test]
fn infer_marks_everything_pending() {
    let (mut tl, clip) = dynamic_timeline(4);
    tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
    assert!(tl.is_up_to_date());

    let snapshot = tl.infer_trajectory();
    assert_eq!(snapshot.canvas_id, CanvasId(7));
    assert_eq!(snapshot.request_id, Some(1));
    assert_eq!(snapshot.keyframes.len(), 1);
    assert_eq!(snapshot.canvas_type, CanvasType::Dynamic);

    assert!(!tl.is_up_to_date());
    assert!(tl.trajectory().iter().all(|p| !p.position_solved && !p.rotation_solved));
}

#[test]
fn solved_flags_converge_per_frame_set() {
    let (mut tl, clip) = dynamic_timeline(5);
    tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
    tl.add_keyframe(&clip, 2, KeyframeProps::xy(0.2, 0.2)).unwrap();
    tl.infer_trajectory();
    tl.drain_events();

    let positions = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];
    tl.apply_inferred_trajectory(Some(&positions), None, &[4, 3]);
    assert_eq!(solved_positions(&tl), vec![false, false, false, true, true]);
    assert_eq!(tl.get_position(4), Some(positions[0]));
    assert_eq!(tl.get_position(3), Some(positions[1]));
    // only [2, 4], which holds frames 3 and 4, is clean
    assert!(tl.position_segments().get(0).unwrap().is_dirty());
    assert!(!tl.position_segments().get(1).unwrap().is_dirty());
    assert!(!tl.is_up_to_date());

    tl.mark_trajectory_points(Some(true), None, Some(&[0, 1, 2]));
    assert!(solved_positions(&tl).iter().all(|s| *s));
    assert!(!tl.is_up_to_date());
    // unchanged results leave segment cleanliness alone
    assert!(tl.position_segments().get(0).unwrap().is_dirty());

    tl.mark_trajectory_points(None, Some(true), None);
    assert!(tl.is_up_to_date());
    let solved: Vec<_> = tl
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, TimelineEvent::TrajectorySolved { .. }))
        .collect();
    assert_eq!(solved, vec![TimelineEvent::TrajectorySolved { canvas: CanvasId(7) }]);
}

#[test]
fn orientation_results_clean_orientation_segments() {
    let (mut tl, clip) = dynamic_timeline(6);
    tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
    tl.add_keyframe(&clip, 3, KeyframeProps::new().with_rot(Rotation::IDENTITY))
        .unwrap();
    tl.infer_trajectory();

    let rot = Rotation::from_row_major_3x3([0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    tl.apply_inferred_trajectory(None, Some(&[rot]), &[3]);

    assert_eq!(tl.get_rotation(3), Some(rot));
    assert!(tl.trajectory()[3].rotation_solved);
    assert!(!tl.trajectory()[3].position_solved);
    // frame 3 is shared by both orientation segments
    assert!(!tl.orientation_segments().has_dirty());
    assert!(tl.position_segments().has_dirty());
}

#[test]
fn out_of_range_result_indices_are_skipped() {
    let (mut tl, _clip) = dynamic_timeline(3);
    tl.infer_trajectory();
    let positions = [Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0)];
    tl.apply_inferred_trajectory(Some(&positions), None, &[9, 0]);
    assert_eq!(tl.get_position(0), Some(positions[1]));
    assert_eq!(solved_positions(&tl), vec![true, false, false]);
}

#[test]
fn abort_cleans_segments_without_touching_poses() {
    let (mut tl, clip) = dynamic_timeline(5);
    tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
    tl.add_keyframe(&clip, 2, KeyframeProps::xy(0.1, 0.9)).unwrap();
    let before: Vec<_> = tl.trajectory().to_vec();
    tl.infer_trajectory();

    tl.aborted_estimation();
    assert!(tl.is_up_to_date());
    assert!(!tl.position_segments().has_dirty());
    assert!(!tl.orientation_segments().has_dirty());
    assert!(!tl.has_dirty_segments());
    for (now, then) in tl.trajectory().iter().zip(&before) {
        assert_eq!(now.position, then.position);
        assert!(!now.position_solved, "abort does not claim frames were solved");
    }
}

#[test]
fn export_import_preserves_structure() {
    let (mut tl, clip) = dynamic_timeline(9);
    tl.add_keyframe(&clip, 0, KeyframeProps::xy(0.5, 0.5)).unwrap();
    tl.add_keyframe(&clip, 4, KeyframeProps::xy(0.3, 0.7).with_depth(-2.0))
        .unwrap();
    tl.add_keyframe(&clip, 6, KeyframeProps::new().with_rot(Rotation::IDENTITY))
        .unwrap();
    tl.set_scale(2.5);

    let export = tl.export();
    let text = serde_json::to_string(&export).unwrap();
    let decoded: CanvasExport = serde_json::from_str(&text).unwrap();
    let back = Timeline::from_export(decoded, &Config::default()).unwrap();

    assert_eq!(back.id(), tl.id());
    assert_eq!(back.scale(), 2.5);
    assert_eq!(back.canvas_type(), CanvasType::Dynamic);
    assert_eq!(back.position_segments(), tl.position_segments());
    assert_eq!(back.orientation_segments(), tl.orientation_segments());
    assert_eq!(
        back.keyframes().cloned().collect::<Vec<_>>(),
        tl.keyframes().cloned().collect::<Vec<_>>()
    );
    assert_eq!(back.get_position(4), tl.get_position(4));
    assert!(back.is_keyframed(6, Prop::Rot));
}

#[test]
fn import_reads_wire_field_names() {
    let value = json!({
        "canvasID": 3,
        "trajectory": [
            {"position": {"x": 0.0, "y": 0.0, "z": 0.0}},
            {"position": {"x": 1.0, "y": 0.0, "z": 0.0}},
            {"position": {"x": 2.0, "y": 0.0, "z": 0.0}}
        ],
        "keyframes": [{"time": 1, "props": {"x": 0.5, "y": 0.5}}],
        "positionSegments": [
            {"start": 1, "end": 2, "mode": 0, "dirty": true},
            {"start": 0, "end": 1, "mode": 1, "dirty": false}
        ],
        "orientationSegments": [{"start": 0, "end": 2, "mode": 1}],
        "type": "static"
    });
    let export: CanvasExport = serde_json::from_value(value).unwrap();
    let tl = Timeline::from_export(export, &Config::default()).unwrap();

    assert_eq!(tl.id(), CanvasId(3));
    assert_eq!(tl.scale(), 1.0);
    assert_eq!(tl.canvas_type(), CanvasType::Static);
    let segs: Vec<_> = tl
        .partition(PoseKind::Position)
        .iter()
        .map(|s| (s.start(), s.end(), s.is_dirty()))
        .collect();
    assert_eq!(segs, vec![(0, 1, false), (1, 2, true)]);
    assert_eq!(tl.keyframe(1).unwrap().props().x, Some(0.5));
    assert_eq!(tl.get_rotation(2), Some(Rotation::IDENTITY));
}

#[test]
fn import_rejects_broken_partitions() {
    let (tl, _clip) = dynamic_timeline(4);
    let mut export = tl.export();
    export.orientation_segments.clear();
    assert_eq!(
        Timeline::from_export(export, &Config::default()).unwrap_err(),
        ImportError::Partition {
            which: "orientation",
            source: PartitionError::Empty,
        }
    );

    let mut export = tl.export();
    export.trajectory.clear();
    assert_eq!(
        Timeline::from_export(export, &Config::default()).unwrap_err(),
        ImportError::EmptyTrajectory
    );
}

#[test]
fn keyframed_segment_queries() {
    let (mut tl, clip) = dynamic_timeline(10);
    tl.add_keyframe(&clip, 3, KeyframeProps::xy(0.5, 0.5)).unwrap();
    tl.add_keyframe(&clip, 6, KeyframeProps::new().with_y(0.2))
        .unwrap();

    // [0,3] and [3,6] touch frame 3; [6,9] has no x anchor.
    let segs = tl.keyframed_segments(PoseKind::Position, Prop::X);
    assert_eq!(segs.len(), 2);
    assert!(tl.get_position_segment(8).is_none());
    assert_eq!(tl.get_position_segment(5).unwrap().start(), 3);
    assert!(tl.get_orientation_segment(5).is_none());
    assert!(tl.has_dirty_segments());

    tl.aborted_estimation();
    assert!(!tl.has_dirty_segments());
}
