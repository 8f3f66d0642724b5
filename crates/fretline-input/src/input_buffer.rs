//! Short-lived queue of timestamped input edges.
//!
//! Key transitions are sampled per frame but judged against the audio clock
//! time at which they were captured. Edges that found nothing to match stay
//! buffered for the retention window, so a key pressed slightly before its
//! stroke (or the reverse) can still be reconciled with an event that becomes
//! current a frame later.

use fretline_model::LaneTarget;
use fretline_rule::{EdgeKind, JudgeLevel, Resolution};

use crate::key_frame::KeyFrame;

/// Default retention window in microseconds.
pub const DEFAULT_RETENTION_US: i64 = 100_000;

/// One captured input occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEdge {
    /// Lane, or `Any` for a stroke made with no lane key held.
    pub target: LaneTarget,
    pub edge: EdgeKind,
    /// Audio clock reading at capture.
    pub clock_us: i64,
    /// A miss for this edge was already reported.
    reported: bool,
}

impl InputEdge {
    pub fn new(target: LaneTarget, edge: EdgeKind, clock_us: i64) -> Self {
        Self {
            target,
            edge,
            clock_us,
            reported: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputBuffer {
    edges: Vec<InputEdge>,
    retention_us: i64,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_US)
    }
}

impl InputBuffer {
    pub fn new(retention_us: i64) -> Self {
        Self {
            edges: Vec::new(),
            retention_us: retention_us.max(0),
        }
    }

    pub fn retention_us(&self) -> i64 {
        self.retention_us
    }

    /// Turn this frame's key snapshot into edges stamped with `clock_us`.
    ///
    /// A stroke yields one stroke edge per held lane, or a single whole-lane
    /// edge when no lane is held. A lane press yields a tap edge only in a
    /// frame without a stroke; a press combined with a stroke is a stroke on
    /// that lane.
    pub fn capture(&mut self, frame: &KeyFrame, clock_us: i64) {
        if !frame.stroke_pressed {
            for lane in frame.pressed_lanes() {
                self.push(InputEdge::new(LaneTarget::Lane(lane), EdgeKind::Tap, clock_us));
            }
            return;
        }
        if frame.any_held() {
            for lane in frame.held_lanes() {
                self.push(InputEdge::new(LaneTarget::Lane(lane), EdgeKind::Stroke, clock_us));
            }
        } else {
            self.push(InputEdge::new(LaneTarget::Any, EdgeKind::Stroke, clock_us));
        }
    }

    pub fn push(&mut self, edge: InputEdge) {
        self.edges.push(edge);
    }

    /// Feed every buffered edge, oldest first, to `resolve`.
    ///
    /// Edges older than the retention window at `now_us` are dropped without
    /// being resolved; an edge that hits is removed. Returns the hits and the
    /// first miss of every stroke edge. Neutral outcomes and tap misses are
    /// not returned.
    pub fn drain<F>(&mut self, now_us: i64, mut resolve: F) -> Vec<(InputEdge, Resolution)>
    where
        F: FnMut(&InputEdge) -> Resolution,
    {
        let mut results = Vec::new();
        let retention_us = self.retention_us;
        self.edges.sort_by_key(|e| e.clock_us);
        self.edges.retain_mut(|edge| {
            if now_us.saturating_sub(edge.clock_us) > retention_us {
                return false;
            }
            let resolution = resolve(&*edge);
            let hit = resolution.level.is_hit();
            let first_miss = resolution.level == JudgeLevel::Miss
                && edge.edge == EdgeKind::Stroke
                && !edge.reported;
            if hit || first_miss {
                edge.reported = true;
                results.push((*edge, resolution));
            }
            !hit
        });
        results
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEdge> {
        self.edges.iter()
    }
}
