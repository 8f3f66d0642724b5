//! One play of one chart.
//!
//! Owns the judge, input buffer and scheduler and drives them once per frame
//! in a fixed order: capture input, sweep expired events, resolve buffered
//! input, update holds, then schedule spawns. Every step of a frame uses the
//! same clock reading.

use std::sync::Arc;

use fretline_config::GameConfig;
use fretline_input::{InputBuffer, InputEdge, KeyFrame};
use fretline_model::{Chart, Lane};
use fretline_rule::{JudgeConfig, JudgeEvent, JudgeManager, ScoreData, VisualRegistry};
use fretline_timing::{AudioClock, SongTimer};
use tracing::info;

use crate::scheduler::{EventScheduler, SpawnRequest};

/// Everything a frame produced, for the feedback and spawn surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub clock_us: i64,
    pub song_time_us: i64,
    /// Auto misses first (by event), then input judgements, then hold outcomes.
    pub judgements: Vec<JudgeEvent>,
    pub spawns: Vec<SpawnRequest>,
}

pub struct PlaySession {
    chart: Arc<Chart>,
    config: GameConfig,
    judge: JudgeManager,
    buffer: InputBuffer,
    scheduler: EventScheduler,
    timer: SongTimer,
    started: bool,
}

impl PlaySession {
    /// Create a session that does nothing until [`start`](Self::start).
    pub fn new(chart: Arc<Chart>, config: GameConfig) -> Self {
        let scheduler = EventScheduler::new(&chart, config.lead_time_us(), config.beats_per_measure);
        let buffer = InputBuffer::new(config.input_buffer_us());
        let timer = SongTimer::new(0, chart.global_offset_us());
        Self {
            chart,
            config,
            judge: JudgeManager::new(),
            buffer,
            scheduler,
            timer,
            started: false,
        }
    }

    /// Start playback one pre-roll from now. Restarting resets every cursor,
    /// hold and buffered edge.
    pub fn start(&mut self, clock: &dyn AudioClock) {
        self.start_at(clock.now_us().saturating_add(self.config.pre_roll_us()));
    }

    /// Start with song time 0 (before offsets) at `song_start_us`.
    pub fn start_at(&mut self, song_start_us: i64) {
        self.timer = SongTimer::new(song_start_us, self.chart.global_offset_us());
        self.timer.set_user_offset_us(self.config.user_offset_us());

        let mut judge_config = JudgeConfig::new(&self.chart, self.config.judge_windows(), song_start_us);
        judge_config.release_grace_us = self.config.hold_release_grace_us();
        judge_config.user_offset_us = self.config.user_offset_us();
        self.judge.init(&judge_config);

        self.buffer.clear();
        self.scheduler.reset();
        self.started = true;
        info!(
            song = self.chart.song_name(),
            song_start_us,
            offset_us = self.timer.total_offset_us(),
            "Play session started"
        );
    }

    pub fn restart(&mut self, clock: &dyn AudioClock) {
        self.start(clock);
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Apply a new calibration offset from the next frame on.
    pub fn set_user_offset_ms(&mut self, offset_ms: i32) {
        self.config.set_user_offset_ms(offset_ms);
        let offset_us = self.config.user_offset_us();
        self.timer.set_user_offset_us(offset_us);
        self.judge.set_user_offset_us(offset_us);
    }

    /// Queue an edge captured between frames with its own clock reading.
    pub fn push_edge(&mut self, edge: InputEdge) {
        if self.started {
            self.buffer.push(edge);
        }
    }

    /// Run one frame at clock reading `clock_us`.
    pub fn tick(
        &mut self,
        clock_us: i64,
        frame: &KeyFrame,
        registry: &mut dyn VisualRegistry,
    ) -> FrameReport {
        let song_time_us = self.timer.song_time_us(clock_us);
        let mut report = FrameReport {
            clock_us,
            song_time_us,
            ..Default::default()
        };
        if !self.started {
            return report;
        }

        self.buffer.capture(frame, clock_us);

        report.judgements = self.judge.auto_miss_sweep(clock_us, registry);

        let judge = &mut self.judge;
        let resolved = self.buffer.drain(clock_us, |edge| {
            judge.resolve(edge.target, edge.edge, edge.clock_us, &mut *registry)
        });
        report
            .judgements
            .extend(resolved.into_iter().map(|(edge, r)| JudgeEvent::Judge {
                event: r.event,
                target: edge.target,
                level: r.level,
                delta_us: r.delta_us,
            }));

        for lane in Lane::all() {
            if let Some(event) = self.judge.update_hold(lane, frame.is_held(lane), clock_us, registry) {
                report.judgements.push(event);
            }
        }

        report.spawns = self.scheduler.update(&self.chart, song_time_us, &self.timer);
        report
    }

    /// Every event judged, every hold resolved and every spawn emitted.
    pub fn is_finished(&self) -> bool {
        self.started && self.judge.is_finished() && self.scheduler.is_finished(&self.chart)
    }

    pub fn song_time_us(&self, clock_us: i64) -> i64 {
        self.timer.song_time_us(clock_us)
    }

    pub fn song_start_us(&self) -> i64 {
        self.timer.song_start_us()
    }

    /// Clock reading at which the session has nothing left to do.
    pub fn end_clock_us(&self) -> i64 {
        let tail = self
            .chart
            .last_time_us()
            .saturating_add(self.config.judge_windows().loose_us())
            .saturating_add(1);
        let spawns = self.scheduler.last_appear_us(&self.chart);
        self.timer.clock_time_us(tail.max(spawns))
    }

    pub fn chart(&self) -> &Arc<Chart> {
        &self.chart
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn judge(&self) -> &JudgeManager {
        &self.judge
    }

    pub fn score(&self) -> &ScoreData {
        self.judge.score()
    }
}
