use serde::Serialize;
use tracing::warn;

use crate::event::{Event, EventId, MAX_TIME_US};

/// A loaded chart: tempo, global offset and time-sorted events.
///
/// Events are sanitized and sorted once in [`Chart::new`] and never
/// reordered afterwards, so an [`EventId`] stays valid for the chart's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    song_name: String,
    bpm: f64,
    global_offset_us: i64,
    events: Vec<Event>,
}

impl Chart {
    /// Build a chart, sanitizing every event and sorting by time, kind, then lane.
    pub fn new(
        song_name: impl Into<String>,
        bpm: f64,
        global_offset_us: i64,
        events: Vec<Event>,
    ) -> Self {
        let song_name = song_name.into();
        if !(bpm.is_finite() && bpm > 0.0) {
            warn!(bpm, song = %song_name, "Chart tempo is not positive, measure lines disabled");
        }
        let clamped_offset_us = global_offset_us.clamp(-MAX_TIME_US, MAX_TIME_US);
        if clamped_offset_us != global_offset_us {
            warn!(global_offset_us, song = %song_name, "Global offset out of range, clamped");
        }
        let mut events: Vec<Event> = events.into_iter().filter_map(Event::sanitize).collect();
        events.sort_by_key(|e| (e.time_us, e.kind, e.target));
        Self {
            song_name,
            bpm,
            global_offset_us: clamped_offset_us,
            events,
        }
    }

    pub fn song_name(&self) -> &str {
        &self.song_name
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Global chart offset in microseconds (may be negative).
    pub fn global_offset_us(&self) -> i64 {
        self.global_offset_us
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.0)
    }

    /// Events paired with their identities, in chart order.
    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.events.iter().enumerate().map(|(i, e)| (EventId(i), e))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Duration of one measure in microseconds, or `None` when tempo or
    /// beats per measure cannot produce one.
    pub fn measure_duration_us(&self, beats_per_measure: u32) -> Option<i64> {
        if !(self.bpm.is_finite() && self.bpm > 0.0) || beats_per_measure == 0 {
            return None;
        }
        let us = (60_000_000.0 / self.bpm * beats_per_measure as f64).round();
        (1.0..=MAX_TIME_US as f64).contains(&us).then_some(us as i64)
    }

    /// Latest time any event still matters (long end or target time).
    pub fn last_time_us(&self) -> i64 {
        self.events
            .iter()
            .map(Event::last_time_us)
            .max()
            .unwrap_or(0)
    }
}
