use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lane::{Lane, LaneTarget};

/// Largest magnitude of any chart time or offset: one day.
pub const MAX_TIME_US: i64 = 24 * 60 * 60 * 1_000_000;

/// Convert seconds to microseconds. Returns `None` for non-finite input or
/// a magnitude beyond [`MAX_TIME_US`].
pub fn secs_to_us(secs: f64) -> Option<i64> {
    let us = (secs * 1_000_000.0).round();
    (us.is_finite() && us.abs() <= MAX_TIME_US as f64).then_some(us as i64)
}

/// Convert microseconds to seconds.
pub fn us_to_secs(us: i64) -> f64 {
    us as f64 / 1_000_000.0
}

/// Note semantics of a chart event.
///
/// Declaration order is the tie-break order used when sorting a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Instant hit: stroke while holding the lane key.
    #[default]
    Normal,
    /// Sustained hold: stroke on the head, keep the lane key held until the end.
    Long,
    /// Whole-lane stroke with no lane key held.
    Mute,
    /// Lane key press edge, no stroke needed.
    Tap,
}

impl EventKind {
    /// Whether events of this kind must name a concrete lane.
    pub fn is_lane_bound(self) -> bool {
        !matches!(self, Self::Mute)
    }
}

/// Identity of an event: its index in the sorted chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub usize);

/// A single scored event in a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub target: LaneTarget,
    /// Target time in microseconds from song start.
    pub time_us: i64,
    /// End time in microseconds (long events only).
    pub end_time_us: Option<i64>,
}

impl Event {
    pub fn normal(lane: Lane, time_us: i64) -> Self {
        Self {
            kind: EventKind::Normal,
            target: LaneTarget::Lane(lane),
            time_us,
            end_time_us: None,
        }
    }

    pub fn long(lane: Lane, time_us: i64, end_time_us: i64) -> Self {
        Self {
            kind: EventKind::Long,
            target: LaneTarget::Lane(lane),
            time_us,
            end_time_us: Some(end_time_us),
        }
    }

    pub fn mute(time_us: i64) -> Self {
        Self {
            kind: EventKind::Mute,
            target: LaneTarget::Any,
            time_us,
            end_time_us: None,
        }
    }

    pub fn tap(lane: Lane, time_us: i64) -> Self {
        Self {
            kind: EventKind::Tap,
            target: LaneTarget::Lane(lane),
            time_us,
            end_time_us: None,
        }
    }

    pub fn lane(&self) -> Option<Lane> {
        self.target.lane()
    }

    pub fn is_long(&self) -> bool {
        self.kind == EventKind::Long
    }

    /// Time the event stops mattering: end time for long events, target time otherwise.
    pub fn last_time_us(&self) -> i64 {
        self.end_time_us.unwrap_or(self.time_us).max(self.time_us)
    }

    /// Duration in microseconds (0 for non-long events).
    pub fn duration_us(&self) -> i64 {
        self.last_time_us() - self.time_us
    }

    /// Reduce the event to its nearest safe interpretation.
    ///
    /// Drops events with a time outside `0..=MAX_TIME_US` or a lane-bound
    /// kind without a lane, strips the lane from mute events and downgrades
    /// long events whose end does not come after their start or lies past
    /// `MAX_TIME_US`.
    pub fn sanitize(mut self) -> Option<Self> {
        if self.time_us < 0 {
            warn!(time_us = self.time_us, kind = ?self.kind, "Dropping event with negative time");
            return None;
        }
        if self.time_us > MAX_TIME_US {
            warn!(time_us = self.time_us, kind = ?self.kind, "Dropping event past the time limit");
            return None;
        }
        if self.kind.is_lane_bound() && self.target.is_any() {
            warn!(time_us = self.time_us, kind = ?self.kind, "Dropping event without a lane");
            return None;
        }
        if self.kind == EventKind::Mute {
            self.target = LaneTarget::Any;
        }
        match (self.kind, self.end_time_us) {
            (EventKind::Long, Some(end)) if end > self.time_us && end <= MAX_TIME_US => {}
            (EventKind::Long, end) => {
                warn!(
                    time_us = self.time_us,
                    end_time_us = ?end,
                    lane = %self.target,
                    "Degenerate long event, downgrading to normal"
                );
                self.kind = EventKind::Normal;
                self.end_time_us = None;
            }
            _ => self.end_time_us = None,
        }
        Some(self)
    }
}
