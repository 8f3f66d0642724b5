//! Judgement engine.
//!
//! Keeps one forward-only cursor per lane for normal/long events, one per
//! lane for tap events and a shared cursor for mute events. Every event is
//! consumed exactly once, either by a matching input or by the auto-miss
//! sweep.

use fretline_model::{Chart, EventId, EventKind, LANE_COUNT, Lane, LaneTarget};
use fretline_timing::SongTimer;
use tracing::{debug, info, warn};

use crate::DEFAULT_RELEASE_GRACE_US;
use crate::hold::{ActiveHold, HoldStep};
use crate::judge_window::{JudgeLevel, JudgeWindows};
use crate::registry::VisualRegistry;
use crate::score_data::ScoreData;

/// Input edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Stroke action, optionally combined with held lane keys.
    Stroke,
    /// Lane key press without the stroke action.
    Tap,
}

/// Result of resolving one input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub level: JudgeLevel,
    /// Event consumed by this input. `None` unless `level` is a hit.
    pub event: Option<EventId>,
    /// `input song time - target time` in µs (positive = late); 0 without a pending event.
    pub delta_us: i64,
}

impl Resolution {
    pub const EMPTY: Self = Self {
        level: JudgeLevel::Empty,
        event: None,
        delta_us: 0,
    };

    fn unmatched(level: JudgeLevel, delta_us: i64) -> Self {
        Self {
            level,
            event: None,
            delta_us,
        }
    }
}

/// Outcome reported to the feedback surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeEvent {
    /// An input was judged or an event was swept as missed.
    Judge {
        event: Option<EventId>,
        target: LaneTarget,
        level: JudgeLevel,
        delta_us: i64,
    },
    /// A long note was released too early.
    HoldBroken { event: EventId, lane: Lane },
    /// A long note was held to its (effective) end.
    HoldCompleted { event: EventId, lane: Lane },
    /// A broken long note reached its original end.
    HoldFailed { event: EventId, lane: Lane },
}

/// Configuration passed to [`JudgeManager::init`].
///
/// A missing chart, an empty chart or missing windows leave the engine inert.
#[derive(Debug, Clone, Copy)]
pub struct JudgeConfig<'a> {
    pub chart: Option<&'a Chart>,
    pub windows: Option<JudgeWindows>,
    pub release_grace_us: i64,
    /// Audio clock reading at which song time 0 (before offsets) occurs.
    pub song_start_us: i64,
    pub user_offset_us: i64,
}

impl<'a> JudgeConfig<'a> {
    pub fn new(chart: &'a Chart, windows: JudgeWindows, song_start_us: i64) -> Self {
        Self {
            chart: Some(chart),
            windows: Some(windows),
            release_grace_us: DEFAULT_RELEASE_GRACE_US,
            song_start_us,
            user_offset_us: 0,
        }
    }
}

/// Timing data of one event, copied out of the chart at init.
#[derive(Debug, Clone, Copy)]
struct Target {
    event: EventId,
    time_us: i64,
    /// End of a long event.
    end_us: Option<i64>,
}

#[derive(Debug, Clone, Default)]
struct Cursor {
    targets: Vec<Target>,
    pos: usize,
}

impl Cursor {
    fn pending(&self) -> Option<&Target> {
        self.targets.get(self.pos)
    }

    fn advance(&mut self) {
        if self.pos < self.targets.len() {
            self.pos += 1;
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.targets.len()
    }
}

#[derive(Debug, Clone)]
pub struct JudgeManager {
    windows: JudgeWindows,
    release_grace_us: i64,
    /// Normal and long events per lane.
    lane_cursors: [Cursor; LANE_COUNT],
    tap_cursors: [Cursor; LANE_COUNT],
    mute_cursor: Cursor,
    holds: [Option<ActiveHold>; LANE_COUNT],
    timer: SongTimer,
    score: ScoreData,
    initialized: bool,
}

impl Default for JudgeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl JudgeManager {
    /// Create an uninitialized (inert) engine.
    pub fn new() -> Self {
        Self {
            windows: JudgeWindows::default(),
            release_grace_us: DEFAULT_RELEASE_GRACE_US,
            lane_cursors: Default::default(),
            tap_cursors: Default::default(),
            mute_cursor: Cursor::default(),
            holds: Default::default(),
            timer: SongTimer::new(0, 0),
            score: ScoreData::default(),
            initialized: false,
        }
    }

    /// Reset every cursor, hold slot and the score, then load the chart.
    pub fn init(&mut self, config: &JudgeConfig<'_>) {
        *self = Self::new();

        let Some(windows) = config.windows else {
            warn!("Judge windows missing; judgement disabled");
            return;
        };
        let Some(chart) = config.chart.filter(|c| !c.is_empty()) else {
            warn!("Chart missing or empty; judgement disabled");
            return;
        };

        for (id, event) in chart.iter() {
            let target = Target {
                event: id,
                time_us: event.time_us,
                end_us: event.end_time_us.filter(|_| event.is_long()),
            };
            match (event.kind, event.lane()) {
                (EventKind::Mute, _) => self.mute_cursor.targets.push(target),
                (EventKind::Tap, Some(lane)) => self.tap_cursors[lane.index()].targets.push(target),
                (EventKind::Normal | EventKind::Long, Some(lane)) => {
                    self.lane_cursors[lane.index()].targets.push(target)
                }
                (kind, None) => warn!(event = id.0, ?kind, "Lane-bound event without lane skipped"),
            }
        }

        self.windows = windows;
        self.release_grace_us = config.release_grace_us.max(0);
        self.timer = SongTimer::new(config.song_start_us, chart.global_offset_us());
        self.timer.set_user_offset_us(config.user_offset_us);
        self.initialized = true;
        info!(
            song = chart.song_name(),
            events = chart.len(),
            tight_us = windows.tight_us(),
            loose_us = windows.loose_us(),
            "Judge manager initialized"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn set_user_offset_us(&mut self, offset_us: i64) {
        self.timer.set_user_offset_us(offset_us);
    }

    pub fn timer(&self) -> &SongTimer {
        &self.timer
    }

    pub fn windows(&self) -> JudgeWindows {
        self.windows
    }

    /// Song time at the given audio clock reading.
    pub fn song_time_us(&self, clock_us: i64) -> i64 {
        self.timer.song_time_us(clock_us)
    }

    /// Consume every pending event that aged past the loose window.
    ///
    /// Must run before input resolution each frame. Running it again at the
    /// same clock reading yields nothing.
    pub fn auto_miss_sweep(
        &mut self,
        clock_us: i64,
        registry: &mut dyn VisualRegistry,
    ) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        if !self.initialized {
            return events;
        }
        let now = self.song_time_us(clock_us);
        let windows = self.windows;

        let cursors = self
            .lane_cursors
            .iter_mut()
            .enumerate()
            .map(|(i, c)| (Lane::from_index(i).map(LaneTarget::Lane), c))
            .chain(
                self.tap_cursors
                    .iter_mut()
                    .enumerate()
                    .map(|(i, c)| (Lane::from_index(i).map(LaneTarget::Lane), c)),
            )
            .chain(std::iter::once((Some(LaneTarget::Any), &mut self.mute_cursor)));

        for (target, cursor) in cursors {
            let target = target.unwrap_or(LaneTarget::Any);
            while let Some(&pending) = cursor.pending() {
                let lateness = now.saturating_sub(pending.time_us);
                if !windows.is_expired(lateness) {
                    break;
                }
                cursor.advance();
                if pending.end_us.is_some() {
                    registry.mark_broken(pending.event);
                }
                debug!(event = pending.event.0, lateness_us = lateness, "Auto miss");
                events.push(JudgeEvent::Judge {
                    event: Some(pending.event),
                    target,
                    level: JudgeLevel::Miss,
                    delta_us: lateness,
                });
            }
        }

        for _ in &events {
            self.score.update(JudgeLevel::Miss);
        }
        events.sort_by_key(|e| match e {
            JudgeEvent::Judge { event, .. } => event.map_or(usize::MAX, |id| id.0),
            _ => usize::MAX,
        });
        events
    }

    /// Judge one input edge captured at `input_clock_us`.
    ///
    /// Stroke edges with a lane go to that lane's normal/long cursor, stroke
    /// edges without a lane go to the mute cursor and tap edges go to the
    /// lane's tap cursor. Accuracy uses the song time at capture, not the
    /// current frame.
    pub fn resolve(
        &mut self,
        target: LaneTarget,
        edge: EdgeKind,
        input_clock_us: i64,
        registry: &mut dyn VisualRegistry,
    ) -> Resolution {
        if !self.initialized {
            return Resolution::EMPTY;
        }
        let Some(cursor) = self.cursor_mut(target, edge) else {
            return Resolution::EMPTY;
        };
        let Some(&pending) = cursor.pending() else {
            return match edge {
                EdgeKind::Tap => Resolution::EMPTY,
                EdgeKind::Stroke => Resolution::unmatched(JudgeLevel::Miss, 0),
            };
        };

        let delta = self.timer.song_time_us(input_clock_us).saturating_sub(pending.time_us);
        let level = self.windows.judge(delta);
        if !level.is_hit() {
            return Resolution::unmatched(level, delta);
        }

        if let (Some(end_us), Some(lane)) = (pending.end_us, target.lane()) {
            let slot = &mut self.holds[lane.index()];
            if let Some(active) = slot {
                warn!(
                    lane = lane.number(),
                    active = active.event().0,
                    event = pending.event.0,
                    "Long note hit while another hold is active; ignored"
                );
                return Resolution::EMPTY;
            }
            *slot = Some(ActiveHold::new(pending.event, lane, pending.time_us, end_us));
            debug!(event = pending.event.0, lane = lane.number(), "Hold started");
        }

        if let Some(cursor) = self.cursor_mut(target, edge) {
            cursor.advance();
        }
        registry.request_despawn(pending.event);
        self.score.update(level);
        Resolution {
            level,
            event: Some(pending.event),
            delta_us: delta,
        }
    }

    /// Poll the active hold on `lane` with this frame's key state.
    ///
    /// Use the same clock reading as the frame's input resolution.
    pub fn update_hold(
        &mut self,
        lane: Lane,
        held: bool,
        clock_us: i64,
        registry: &mut dyn VisualRegistry,
    ) -> Option<JudgeEvent> {
        if !self.initialized {
            return None;
        }
        let now = self.song_time_us(clock_us);
        let slot = &mut self.holds[lane.index()];
        let hold = slot.as_mut()?;
        let event = hold.event();

        match hold.update(now, held, self.release_grace_us) {
            HoldStep::Waiting => None,
            HoldStep::Broke => {
                debug!(event = event.0, lane = lane.number(), "Hold broken");
                registry.mark_broken(event);
                Some(JudgeEvent::HoldBroken { event, lane })
            }
            HoldStep::Completed => {
                *slot = None;
                debug!(event = event.0, lane = lane.number(), "Hold completed");
                registry.mark_completed(event);
                self.score.on_hold_completed();
                Some(JudgeEvent::HoldCompleted { event, lane })
            }
            HoldStep::Failed => {
                *slot = None;
                debug!(event = event.0, lane = lane.number(), "Hold failed");
                self.score.on_hold_failed();
                Some(JudgeEvent::HoldFailed { event, lane })
            }
        }
    }

    /// Every event consumed and no hold pending.
    pub fn is_finished(&self) -> bool {
        self.lane_cursors.iter().all(Cursor::is_exhausted)
            && self.tap_cursors.iter().all(Cursor::is_exhausted)
            && self.mute_cursor.is_exhausted()
            && self.holds.iter().all(Option::is_none)
    }

    /// Next unconsumed event an edge of this kind would be judged against.
    pub fn pending_event(&self, target: LaneTarget, edge: EdgeKind) -> Option<EventId> {
        let cursor = match (edge, target) {
            (EdgeKind::Stroke, LaneTarget::Lane(lane)) => &self.lane_cursors[lane.index()],
            (EdgeKind::Stroke, LaneTarget::Any) => &self.mute_cursor,
            (EdgeKind::Tap, LaneTarget::Lane(lane)) => &self.tap_cursors[lane.index()],
            (EdgeKind::Tap, LaneTarget::Any) => return None,
        };
        cursor.pending().map(|t| t.event)
    }

    pub fn active_hold(&self, lane: Lane) -> Option<&ActiveHold> {
        self.holds[lane.index()].as_ref()
    }

    // --- Getters ---

    pub fn score(&self) -> &ScoreData {
        &self.score
    }

    fn cursor_mut(&mut self, target: LaneTarget, edge: EdgeKind) -> Option<&mut Cursor> {
        match (edge, target) {
            (EdgeKind::Stroke, LaneTarget::Lane(lane)) => Some(&mut self.lane_cursors[lane.index()]),
            (EdgeKind::Stroke, LaneTarget::Any) => Some(&mut self.mute_cursor),
            (EdgeKind::Tap, LaneTarget::Lane(lane)) => Some(&mut self.tap_cursors[lane.index()]),
            (EdgeKind::Tap, LaneTarget::Any) => None,
        }
    }
}
