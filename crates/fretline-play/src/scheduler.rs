//! Appear-time scheduling of chart events and measure lines.
//!
//! Independent of judgement: the scheduler only walks the chart by appear
//! time and never touches judge cursors.

use fretline_model::{Chart, EventId, EventKind, LaneTarget};
use fretline_timing::SongTimer;
use tracing::debug;

/// A request for the spawn surface to create an on-screen object.
///
/// Times are absolute audio clock readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRequest {
    Note {
        event: EventId,
        target: LaneTarget,
        kind: EventKind,
        appear_us: i64,
        hit_us: i64,
        /// Clock time of a long note's end.
        end_us: Option<i64>,
    },
    MeasureLine {
        index: u32,
        appear_us: i64,
        hit_us: i64,
    },
}

#[derive(Debug, Clone)]
pub struct EventScheduler {
    /// Next chart event to spawn.
    pointer: usize,
    /// Next measure line to spawn.
    measure_index: u32,
    measure_duration_us: Option<i64>,
    /// Last measure line index (inclusive).
    last_measure: Option<u32>,
    lead_time_us: i64,
}

impl EventScheduler {
    /// Measure lines run from song time 0 through the measure following the
    /// chart's last event. A chart without a valid tempo gets none.
    pub fn new(chart: &Chart, lead_time_us: i64, beats_per_measure: u32) -> Self {
        let measure_duration_us = chart
            .measure_duration_us(beats_per_measure)
            .filter(|&d| d > 0);
        let last_measure = match measure_duration_us {
            Some(d) if !chart.is_empty() => {
                let last = (chart.last_time_us() / d).saturating_add(1);
                Some(u32::try_from(last).unwrap_or(u32::MAX))
            }
            _ => None,
        };
        Self {
            pointer: 0,
            measure_index: 0,
            measure_duration_us,
            last_measure,
            lead_time_us: lead_time_us.max(0),
        }
    }

    pub fn reset(&mut self) {
        self.pointer = 0;
        self.measure_index = 0;
    }

    pub fn lead_time_us(&self) -> i64 {
        self.lead_time_us
    }

    /// Emit every note and measure line whose appear time has been reached.
    pub fn update(&mut self, chart: &Chart, song_time_us: i64, timer: &SongTimer) -> Vec<SpawnRequest> {
        let mut spawns = Vec::new();

        let events = chart.events();
        while let Some(event) = events.get(self.pointer) {
            if song_time_us < event.time_us.saturating_sub(self.lead_time_us) {
                break;
            }
            let hit_us = timer.clock_time_us(event.time_us);
            spawns.push(SpawnRequest::Note {
                event: EventId(self.pointer),
                target: event.target,
                kind: event.kind,
                appear_us: hit_us.saturating_sub(self.lead_time_us),
                hit_us,
                end_us: event
                    .end_time_us
                    .filter(|_| event.is_long())
                    .map(|end| timer.clock_time_us(end)),
            });
            self.pointer += 1;
        }

        if let (Some(duration), Some(last)) = (self.measure_duration_us, self.last_measure) {
            while self.measure_index <= last {
                let measure_time = i64::from(self.measure_index).saturating_mul(duration);
                if song_time_us < measure_time.saturating_sub(self.lead_time_us) {
                    break;
                }
                let hit_us = timer.clock_time_us(measure_time);
                spawns.push(SpawnRequest::MeasureLine {
                    index: self.measure_index,
                    appear_us: hit_us.saturating_sub(self.lead_time_us),
                    hit_us,
                });
                self.measure_index += 1;
            }
        }

        if !spawns.is_empty() {
            debug!(count = spawns.len(), song_time_us, "Spawn requests");
        }
        spawns
    }

    /// Song time at which the last note or measure line appears.
    pub fn last_appear_us(&self, chart: &Chart) -> i64 {
        let last_note = chart.events().last().map_or(0, |e| e.time_us);
        let last_line = match (self.measure_duration_us, self.last_measure) {
            (Some(d), Some(last)) => i64::from(last).saturating_mul(d),
            _ => 0,
        };
        last_note.max(last_line).saturating_sub(self.lead_time_us)
    }

    /// Every event and measure line has been emitted.
    pub fn is_finished(&self, chart: &Chart) -> bool {
        let measures_done = self.last_measure.is_none_or(|last| self.measure_index > last);
        self.pointer >= chart.len() && measures_done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fretline_model::{Event, Lane};

    const SEC: i64 = 1_000_000;

    fn lane(n: u8) -> Lane {
        Lane::new(n).unwrap()
    }

    /// 120 BPM, 4/4: one measure every 2 s.
    fn chart() -> Chart {
        Chart::new(
            "sched",
            120.0,
            0,
            vec![
                Event::normal(lane(1), SEC),
                Event::long(lane(2), 3 * SEC, 4 * SEC),
                Event::mute(3 * SEC),
            ],
        )
    }

    fn notes(spawns: &[SpawnRequest]) -> Vec<EventId> {
        spawns
            .iter()
            .filter_map(|s| match s {
                SpawnRequest::Note { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    fn measures(spawns: &[SpawnRequest]) -> Vec<u32> {
        spawns
            .iter()
            .filter_map(|s| match s {
                SpawnRequest::MeasureLine { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn notes_appear_lead_time_early() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        assert!(notes(&s.update(&c, 400_000, &timer)).is_empty());
        let spawns = s.update(&c, 500_000, &timer);
        assert_eq!(notes(&spawns), vec![EventId(0)]);
        assert_eq!(
            spawns[0],
            SpawnRequest::Note {
                event: EventId(0),
                target: LaneTarget::Lane(lane(1)),
                kind: EventKind::Normal,
                appear_us: 500_000,
                hit_us: SEC,
                end_us: None,
            }
        );
        assert!(notes(&s.update(&c, 500_000, &timer)).is_empty());
    }

    #[test]
    fn clock_times_include_start_and_offsets() {
        let c = chart();
        let mut timer = SongTimer::new(10 * SEC, 50_000);
        timer.set_user_offset_us(-20_000);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        let spawns = s.update(&c, 2_600_000, &timer);
        let long = spawns
            .iter()
            .find(|r| matches!(r, SpawnRequest::Note { kind: EventKind::Long, .. }))
            .unwrap();
        assert_eq!(
            *long,
            SpawnRequest::Note {
                event: EventId(1),
                target: LaneTarget::Lane(lane(2)),
                kind: EventKind::Long,
                appear_us: 12_530_000,
                hit_us: 13_030_000,
                end_us: Some(14_030_000),
            }
        );
    }

    #[test]
    fn catches_up_after_a_long_frame() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        let spawns = s.update(&c, 10 * SEC, &timer);
        assert_eq!(notes(&spawns), vec![EventId(0), EventId(1), EventId(2)]);
        assert_eq!(measures(&spawns), vec![0, 1, 2, 3]);
        assert!(s.is_finished(&c));
    }

    #[test]
    fn measure_lines_follow_tempo() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        assert_eq!(measures(&s.update(&c, -500_000, &timer)), vec![0]);
        assert!(measures(&s.update(&c, 1_400_000, &timer)).is_empty());
        let spawns = s.update(&c, 1_500_000, &timer);
        assert_eq!(measures(&spawns), vec![1]);
        assert_eq!(
            spawns.last(),
            Some(&SpawnRequest::MeasureLine {
                index: 1,
                appear_us: 1_500_000,
                hit_us: 2 * SEC,
            })
        );
    }

    #[test]
    fn measure_lines_stop_after_last_event() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        // Last event ends at 4 s (measure 2); one more measure follows.
        let spawns = s.update(&c, 100 * SEC, &timer);
        assert_eq!(measures(&spawns), vec![0, 1, 2, 3]);
        assert!(s.update(&c, 200 * SEC, &timer).is_empty());
    }

    #[test]
    fn last_appear_covers_trailing_measure() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        // Measure 3 hits at 6 s.
        assert_eq!(s.last_appear_us(&c), 5_500_000);
        s.update(&c, 5_499_999, &timer);
        assert!(!s.is_finished(&c));
        s.update(&c, 5_500_000, &timer);
        assert!(s.is_finished(&c));
    }

    #[test]
    fn no_measure_lines_without_tempo() {
        let c = Chart::new("flat", 0.0, 0, vec![Event::normal(lane(1), SEC)]);
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        assert!(measures(&s.update(&c, 10 * SEC, &timer)).is_empty());
        assert!(s.is_finished(&c));
    }

    #[test]
    fn reset_replays() {
        let c = chart();
        let timer = SongTimer::new(0, 0);
        let mut s = EventScheduler::new(&c, 500_000, 4);
        s.update(&c, 100 * SEC, &timer);
        s.reset();
        assert!(!s.is_finished(&c));
        assert_eq!(notes(&s.update(&c, 100 * SEC, &timer)).len(), 3);
    }
}
