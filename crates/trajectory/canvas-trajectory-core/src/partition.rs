//! Ordered segment partitions and the split/merge algorithms.
//!
//! A partition of a trajectory with `N` frames is a list of segments kept
//! sorted by `start` that covers `[0, N-1]`. Adjacent segments share their
//! boundary frame: `segments[i].end == segments[i + 1].start`. Boundary frames
//! are where keyframes split the timeline, so every interior frame belongs to
//! exactly one segment and every shared boundary to exactly two.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::PartitionError;
use crate::segment::{InterpolationMode, SegmentId, TrajectorySegment};

/// What a split did to the partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The segment was cut into the given pieces.
    Split {
        left: Option<SegmentId>,
        right: Option<SegmentId>,
    },
    /// The frame was already an outer edge of its only segment, now dirty.
    AlreadyBoundary(SegmentId),
    /// The frame is shared by two segments, both now dirty.
    SharedBoundary(SegmentId, SegmentId),
}

/// What a merge left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Index of the resulting segment.
    pub index: usize,
    /// False when only one side existed and it was just marked dirty.
    pub merged: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition {
    segments: Vec<TrajectorySegment>,
}

impl Partition {
    /// One clean segment spanning `[0, len-1]`.
    pub fn full(len: usize, mode: InterpolationMode) -> Self {
        let mut full = TrajectorySegment::new(0, len.saturating_sub(1), mode);
        full.mark_clean();
        Self {
            segments: vec![full],
        }
    }

    /// Rebuild a partition from serialized segments, sorting them by start and
    /// checking they cover `[0, len-1]`.
    pub fn from_segments(
        mut segments: Vec<TrajectorySegment>,
        len: usize,
    ) -> Result<Self, PartitionError> {
        segments.sort_by_key(|s| (s.start(), s.end()));
        let partition = Self { segments };
        partition.validate(len)?;
        Ok(partition)
    }

    /// Check the cover invariant for a trajectory of `len` frames.
    pub fn validate(&self, len: usize) -> Result<(), PartitionError> {
        let first = self.segments.first().ok_or(PartitionError::Empty)?;
        if first.start() != 0 {
            return Err(PartitionError::BadStart {
                start: first.start(),
            });
        }
        for s in &self.segments {
            if s.start() > s.end() {
                return Err(PartitionError::Inverted {
                    start: s.start(),
                    end: s.end(),
                });
            }
            if s.start() == s.end() && self.segments.len() > 1 {
                return Err(PartitionError::Degenerate { time: s.start() });
            }
        }
        for pair in self.segments.windows(2) {
            if pair[0].end() != pair[1].start() {
                return Err(PartitionError::Discontinuous {
                    end: pair[0].end(),
                    next_start: pair[1].start(),
                });
            }
        }
        let expected = len.saturating_sub(1);
        let last_end = self.segments[self.segments.len() - 1].end();
        if last_end != expected {
            return Err(PartitionError::BadEnd {
                end: last_end,
                expected,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectorySegment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[TrajectorySegment] {
        &self.segments
    }

    pub fn get(&self, index: usize) -> Option<&TrajectorySegment> {
        self.segments.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrajectorySegment> {
        self.segments.get_mut(index)
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.segments.iter().map(TrajectorySegment::id).collect()
    }

    /// First segment containing `time` (binary search on `start`). At a shared
    /// boundary this is the segment on the left.
    pub fn segment_at(&self, time: usize) -> Option<&TrajectorySegment> {
        self.index_at(time).map(|idx| &self.segments[idx])
    }

    pub fn segment_at_mut(&mut self, time: usize) -> Option<&mut TrajectorySegment> {
        self.index_at(time).map(move |idx| &mut self.segments[idx])
    }

    fn index_at(&self, time: usize) -> Option<usize> {
        let idx = self.segments.partition_point(|s| s.start() < time);
        // segments[idx] starts at or after `time`; the left neighbour may still hold it.
        if idx > 0 && self.segments[idx - 1].contains(time) {
            return Some(idx - 1);
        }
        self.segments
            .get(idx)
            .filter(|s| s.contains(time))
            .map(|_| idx)
    }

    /// Index of the segment whose `end == time`.
    pub fn ending_at(&self, time: usize) -> Option<usize> {
        self.segments.iter().position(|s| s.end() == time)
    }

    /// Index of the segment whose `start == time`.
    pub fn starting_at(&self, time: usize) -> Option<usize> {
        self.segments.iter().position(|s| s.start() == time)
    }

    /// Indices of every segment containing `time`.
    fn containing(&self, time: usize) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.contains(time))
            .map(|(i, _)| i)
            .collect()
    }

    /// Split at a keyframed frame.
    ///
    /// A frame strictly inside its segment cuts it into `[start, time]` and
    /// `[time, end]`, both dirty and inheriting the mode. A frame that already
    /// is a boundary only dirties the segments touching it. Any other shape is
    /// an invariant violation and leaves the partition untouched.
    pub fn split_at(&mut self, time: usize) -> Result<SplitOutcome, PartitionError> {
        let containing = self.containing(time);
        match containing.as_slice() {
            &[idx] => {
                let old = &self.segments[idx];
                if old.start() == time || old.end() == time {
                    let id = old.id();
                    self.segments[idx].mark_dirty();
                    debug!("frame {time} is already an edge of {id:?}; marked dirty");
                    return Ok(SplitOutcome::AlreadyBoundary(id));
                }

                let (start, end, mode) = (old.start(), old.end(), old.mode());
                let mut pieces = Vec::with_capacity(2);
                let left = (time > start).then(|| TrajectorySegment::new(start, time, mode));
                let right = (end > time).then(|| TrajectorySegment::new(time, end, mode));
                let outcome = SplitOutcome::Split {
                    left: left.as_ref().map(TrajectorySegment::id),
                    right: right.as_ref().map(TrajectorySegment::id),
                };
                pieces.extend(left);
                pieces.extend(right);
                self.segments.splice(idx..=idx, pieces);
                debug!("split [{start}, {end}] at frame {time}");
                Ok(outcome)
            }
            &[a, b] => {
                self.segments[a].mark_dirty();
                self.segments[b].mark_dirty();
                Ok(SplitOutcome::SharedBoundary(
                    self.segments[a].id(),
                    self.segments[b].id(),
                ))
            }
            other => Err(PartitionError::InvariantViolation {
                time,
                containing: other.len(),
            }),
        }
    }

    /// Merge the two segments meeting at `time` into one dirty segment that
    /// takes the left segment's mode. When only one side exists (a global
    /// timeline edge, or the single segment of a one-frame trajectory) it is
    /// marked dirty and returned unmerged.
    pub fn merge_at(&mut self, time: usize) -> Result<MergeOutcome, PartitionError> {
        let left = self.ending_at(time);
        let right = self.starting_at(time);

        match (left, right) {
            (Some(l), Some(r)) if l != r => {
                let merged = TrajectorySegment::new(
                    self.segments[l].start(),
                    self.segments[r].end(),
                    self.segments[l].mode(),
                );
                debug!(
                    "merge {} and {} at frame {time}",
                    self.segments[l], self.segments[r]
                );
                let (lo, hi) = (l.min(r), l.max(r));
                self.segments.remove(hi);
                self.segments[lo] = merged;
                Ok(MergeOutcome {
                    index: lo,
                    merged: true,
                })
            }
            (Some(only), _) | (None, Some(only)) => {
                self.segments[only].mark_dirty();
                Ok(MergeOutcome {
                    index: only,
                    merged: false,
                })
            }
            (None, None) => Err(PartitionError::NotABoundary { time }),
        }
    }

    /// Dirty the segments on both sides of `time` without restructuring.
    pub fn mark_adjacent_dirty(&mut self, time: usize) {
        if let Some(l) = self.ending_at(time) {
            self.segments[l].mark_dirty();
        }
        if let Some(r) = self.starting_at(time) {
            self.segments[r].mark_dirty();
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.segments.iter_mut().for_each(TrajectorySegment::mark_dirty);
    }

    pub fn mark_all_clean(&mut self) {
        self.segments.iter_mut().for_each(TrajectorySegment::mark_clean);
    }

    /// Mark clean every segment containing `time` (two at a shared boundary).
    pub fn mark_clean_containing(&mut self, time: usize) {
        for s in self.segments.iter_mut().filter(|s| s.contains(time)) {
            s.mark_clean();
        }
    }

    pub fn has_dirty(&self) -> bool {
        self.segments.iter().any(TrajectorySegment::is_dirty)
    }

    pub fn export(&self) -> Vec<TrajectorySegment> {
        self.segments.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(p: &Partition) -> Vec<(usize, usize)> {
        p.iter().map(|s| (s.start(), s.end())).collect()
    }

    #[test]
    fn split_interior_frame_cuts_in_two() {
        let mut p = Partition::full(10, InterpolationMode::Tracking);
        let outcome = p.split_at(4).unwrap();
        assert_eq!(
            outcome,
            SplitOutcome::Split {
                left: Some(SegmentId { start: 0, end: 4 }),
                right: Some(SegmentId { start: 4, end: 9 }),
            }
        );
        assert_eq!(bounds(&p), vec![(0, 4), (4, 9)]);
        assert!(p.iter().all(|s| s.is_dirty()));
        p.validate(10).unwrap();
    }

    #[test]
    fn split_at_edge_only_dirties() {
        let mut p = Partition::full(5, InterpolationMode::Linear);
        assert!(!p.has_dirty());
        assert!(matches!(p.split_at(0), Ok(SplitOutcome::AlreadyBoundary(_))));
        assert_eq!(bounds(&p), vec![(0, 4)]);
        assert!(p.has_dirty());
    }

    #[test]
    fn split_at_shared_boundary_dirties_both() {
        let mut p = Partition::full(9, InterpolationMode::Tracking);
        p.split_at(3).unwrap();
        p.mark_all_clean();
        assert!(matches!(
            p.split_at(3),
            Ok(SplitOutcome::SharedBoundary(_, _))
        ));
        assert_eq!(bounds(&p), vec![(0, 3), (3, 8)]);
        assert!(p.iter().all(|s| s.is_dirty()));
    }

    #[test]
    fn split_outside_partition_is_rejected_without_mutation() {
        let mut p = Partition::full(4, InterpolationMode::Tracking);
        let before = p.clone();
        assert_eq!(
            p.split_at(12),
            Err(PartitionError::InvariantViolation {
                time: 12,
                containing: 0
            })
        );
        assert_eq!(p, before);
    }

    #[test]
    fn merge_takes_left_mode() {
        let mut p = Partition::full(9, InterpolationMode::Tracking);
        p.split_at(3).unwrap();
        p.get_mut(0).unwrap().set_linear();
        let out = p.merge_at(3).unwrap();
        assert!(out.merged);
        assert_eq!(bounds(&p), vec![(0, 8)]);
        assert_eq!(p.get(0).unwrap().mode(), InterpolationMode::Linear);
        assert!(p.get(0).unwrap().is_dirty());
    }

    #[test]
    fn merge_at_global_edge_keeps_structure() {
        let mut p = Partition::full(6, InterpolationMode::Tracking);
        let out = p.merge_at(5).unwrap();
        assert!(!out.merged);
        assert_eq!(bounds(&p), vec![(0, 5)]);
        assert!(p.get(0).unwrap().is_dirty());
    }

    #[test]
    fn merge_on_single_frame_partition_only_dirties() {
        let mut p = Partition::full(1, InterpolationMode::Linear);
        let out = p.merge_at(0).unwrap();
        assert_eq!(
            out,
            MergeOutcome {
                index: 0,
                merged: false
            }
        );
        assert_eq!(bounds(&p), vec![(0, 0)]);
        assert_eq!(p.get(0).unwrap().mode(), InterpolationMode::Linear);
        assert!(p.get(0).unwrap().is_dirty());
        p.validate(1).unwrap();
    }

    #[test]
    fn merge_at_interior_non_boundary_is_an_error() {
        let mut p = Partition::full(6, InterpolationMode::Tracking);
        assert_eq!(
            p.merge_at(2),
            Err(PartitionError::NotABoundary { time: 2 })
        );
    }

    #[test]
    fn segment_at_prefers_left_at_boundary() {
        let mut p = Partition::full(9, InterpolationMode::Tracking);
        p.split_at(3).unwrap();
        p.split_at(6).unwrap();
        assert_eq!(p.segment_at(3).unwrap().id(), SegmentId { start: 0, end: 3 });
        assert_eq!(p.segment_at(4).unwrap().id(), SegmentId { start: 3, end: 6 });
        assert_eq!(p.segment_at(8).unwrap().id(), SegmentId { start: 6, end: 8 });
        assert!(p.segment_at(9).is_none());
    }

    #[test]
    fn from_segments_sorts_and_validates() {
        let segs = vec![
            TrajectorySegment::new(4, 7, InterpolationMode::Linear),
            TrajectorySegment::new(0, 4, InterpolationMode::Tracking),
        ];
        let p = Partition::from_segments(segs, 8).unwrap();
        assert_eq!(bounds(&p), vec![(0, 4), (4, 7)]);

        let gap = vec![
            TrajectorySegment::new(0, 3, InterpolationMode::Tracking),
            TrajectorySegment::new(4, 7, InterpolationMode::Tracking),
        ];
        assert_eq!(
            Partition::from_segments(gap, 8),
            Err(PartitionError::Discontinuous {
                end: 3,
                next_start: 4
            })
        );

        let short = vec![TrajectorySegment::new(0, 5, InterpolationMode::Tracking)];
        assert_eq!(
            Partition::from_segments(short, 8),
            Err(PartitionError::BadEnd {
                end: 5,
                expected: 7
            })
        );
    }
}
