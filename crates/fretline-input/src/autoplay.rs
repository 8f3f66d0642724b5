//! Autoplay key frame generation.
//!
//! Produces the key snapshots a perfect player would produce for a chart,
//! one frame at a time, so autoplay goes through the same input buffer and
//! judge path as real input.

use fretline_model::{Chart, EventKind, LANE_COUNT, Lane};
use tracing::debug;

use crate::key_frame::KeyFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Hold the lane (until `release_us` for long notes) and stroke.
    Strum { lane: Lane, release_us: Option<i64> },
    Mute,
    Tap(Lane),
}

#[derive(Debug, Clone, Copy)]
struct Cue {
    time_us: i64,
    action: Action,
}

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    cues: Vec<Cue>,
    pos: usize,
    /// Song time until which each lane key stays down.
    hold_until: [i64; LANE_COUNT],
}

impl AutoPlayer {
    pub fn new(chart: &Chart) -> Self {
        let cues = chart
            .events()
            .iter()
            .filter_map(|event| {
                let action = match (event.kind, event.lane()) {
                    (EventKind::Mute, _) => Action::Mute,
                    (EventKind::Tap, Some(lane)) => Action::Tap(lane),
                    (EventKind::Normal, Some(lane)) => Action::Strum {
                        lane,
                        release_us: None,
                    },
                    (EventKind::Long, Some(lane)) => Action::Strum {
                        lane,
                        release_us: event.end_time_us,
                    },
                    (_, None) => return None,
                };
                Some(Cue {
                    time_us: event.time_us,
                    action,
                })
            })
            .collect();
        Self {
            cues,
            pos: 0,
            hold_until: [i64::MIN; LANE_COUNT],
        }
    }

    /// Every cue has been played.
    pub fn is_done(&self) -> bool {
        self.pos >= self.cues.len()
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.hold_until = [i64::MIN; LANE_COUNT];
    }

    /// Key snapshot for the frame at `song_time_us`.
    ///
    /// A mute stroke needs every lane key up and a tap needs a frame without
    /// a stroke, so conflicting cues due in the same frame are split across
    /// consecutive frames. A mute that falls inside a held long note cannot
    /// be played and is skipped.
    pub fn frame(&mut self, song_time_us: i64) -> KeyFrame {
        let mut frame = KeyFrame::new();
        for lane in Lane::all() {
            if self.hold_until[lane.index()] > song_time_us {
                frame = frame.with_held(lane);
            }
        }
        let sustained = frame.any_held();

        while let Some(&cue) = self.cues.get(self.pos) {
            if cue.time_us > song_time_us {
                break;
            }
            if cue.action == Action::Mute && sustained {
                debug!(time_us = cue.time_us, "Mute during a hold skipped");
                self.pos += 1;
                continue;
            }
            let tapped = frame.pressed_lanes().next().is_some();
            let conflict = match cue.action {
                Action::Mute => frame.stroke_pressed || frame.any_held(),
                Action::Strum { .. } => tapped || (frame.stroke_pressed && !frame.any_held()),
                Action::Tap(_) => frame.stroke_pressed,
            };
            if conflict {
                break;
            }
            match cue.action {
                Action::Strum { lane, release_us } => {
                    if let Some(release_us) = release_us {
                        self.hold_until[lane.index()] = release_us;
                    }
                    frame = frame.with_held(lane).with_stroke();
                }
                Action::Mute => frame = frame.with_stroke(),
                Action::Tap(lane) => frame = frame.with_press(lane),
            }
            self.pos += 1;
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fretline_model::Event;

    fn lane(n: u8) -> Lane {
        Lane::new(n).unwrap()
    }

    #[test]
    fn normal_note_strums_held_lane() {
        let chart = Chart::new("t", 120.0, 0, vec![Event::normal(lane(2), 1_000_000)]);
        let mut ap = AutoPlayer::new(&chart);
        assert!(ap.frame(990_000).is_idle());
        let f = ap.frame(1_000_000);
        assert!(f.stroke_pressed);
        assert!(f.is_held(lane(2)));
        assert!(f.pressed_lanes().next().is_none());
        assert!(ap.is_done());
        assert!(ap.frame(1_016_000).is_idle());
    }

    #[test]
    fn long_note_held_until_end() {
        let chart = Chart::new("t", 120.0, 0, vec![Event::long(lane(1), 1_000_000, 2_000_000)]);
        let mut ap = AutoPlayer::new(&chart);
        assert!(ap.frame(1_000_000).stroke_pressed);
        let mid = ap.frame(1_500_000);
        assert!(mid.is_held(lane(1)));
        assert!(!mid.stroke_pressed);
        assert!(!ap.frame(2_000_000).is_held(lane(1)));
    }

    #[test]
    fn tap_note_presses_lane_without_stroke() {
        let chart = Chart::new("t", 120.0, 0, vec![Event::tap(lane(6), 500_000)]);
        let mut ap = AutoPlayer::new(&chart);
        let f = ap.frame(500_000);
        assert!(f.lane_pressed[lane(6).index()]);
        assert!(!f.stroke_pressed);
    }

    #[test]
    fn mute_and_strum_split_across_frames() {
        let chart = Chart::new(
            "t",
            120.0,
            0,
            vec![Event::normal(lane(3), 1_000_000), Event::mute(1_000_000)],
        );
        let mut ap = AutoPlayer::new(&chart);
        let first = ap.frame(1_000_000);
        assert!(first.stroke_pressed && first.is_held(lane(3)));
        let second = ap.frame(1_016_000);
        assert!(second.stroke_pressed && !second.any_held());
        assert!(ap.is_done());
    }

    #[test]
    fn mute_inside_hold_is_skipped() {
        let chart = Chart::new(
            "t",
            120.0,
            0,
            vec![
                Event::long(lane(1), 1_000_000, 3_000_000),
                Event::mute(2_000_000),
                Event::normal(lane(4), 2_200_000),
            ],
        );
        let mut ap = AutoPlayer::new(&chart);
        ap.frame(1_000_000);
        let at_mute = ap.frame(2_000_000);
        assert!(!at_mute.stroke_pressed);
        let f = ap.frame(2_200_000);
        assert!(f.stroke_pressed);
        assert!(f.is_held(lane(4)) && f.is_held(lane(1)));
        assert!(ap.is_done());
    }

    #[test]
    fn tap_and_strum_split_across_frames() {
        let chart = Chart::new(
            "t",
            120.0,
            0,
            vec![Event::normal(lane(2), 1_000_000), Event::tap(lane(5), 1_000_000)],
        );
        let mut ap = AutoPlayer::new(&chart);
        let first = ap.frame(1_000_000);
        assert!(first.stroke_pressed);
        assert!(first.pressed_lanes().next().is_none());
        let second = ap.frame(1_016_000);
        assert!(!second.stroke_pressed);
        assert!(second.lane_pressed[lane(5).index()]);
        assert!(ap.is_done());
    }

    #[test]
    fn reset_replays_from_start() {
        let chart = Chart::new("t", 120.0, 0, vec![Event::mute(0)]);
        let mut ap = AutoPlayer::new(&chart);
        ap.frame(0);
        assert!(ap.is_done());
        ap.reset();
        assert!(!ap.is_done());
        assert!(ap.frame(0).stroke_pressed);
    }
}
