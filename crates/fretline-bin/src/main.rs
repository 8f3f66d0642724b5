// fretline: headless chart simulator.
//
// Plays a chart under autoplay against a manual clock with jittered frame
// intervals and prints the resulting score.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use fretline_config::GameConfig;
use fretline_input::AutoPlayer;
use fretline_model::{Chart, ChartDecoder};
use fretline_play::PlaySession;
use fretline_rule::{JudgeEvent, RecordingRegistry, ScoreData};
use fretline_timing::{AudioClock, ManualClock};

#[derive(Parser, Debug)]
#[command(name = "fretline", about = "Headless rhythm chart simulator")]
struct Args {
    /// Path to a chart JSON file.
    #[arg(long)]
    chart: PathBuf,

    /// Path to game config JSON file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Maximum random deviation of each frame interval.
    #[arg(long, default_value_t = 8)]
    jitter_ms: u32,

    /// Seed for frame jitter.
    #[arg(long, env = "FRETLINE_SEED")]
    seed: Option<u64>,

    /// Calibration offset override.
    #[arg(long, allow_hyphen_values = true)]
    offset_ms: Option<i32>,
}

struct Simulation {
    fps: u32,
    jitter_us: i64,
    seed: u64,
}

impl Simulation {
    fn frame_us(&self) -> i64 {
        1_000_000 / i64::from(self.fps.max(1))
    }

    /// Run `chart` to completion and return the final score.
    fn run(&self, chart: Arc<Chart>, config: GameConfig) -> ScoreData {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let clock = ManualClock::new();
        let mut auto = AutoPlayer::new(&chart);
        let mut session = PlaySession::new(chart, config);
        let mut registry = RecordingRegistry::new();
        session.start(&clock);

        let frame_us = self.frame_us();
        let jitter_us = self.jitter_us.min(frame_us - 1).max(0);
        let deadline = session.end_clock_us() + session.config().lead_time_us();
        let mut frames = 0u64;
        while !session.is_finished() && clock.now_us() <= deadline {
            let now = clock.now_us();
            let frame = auto.frame(session.song_time_us(now));
            let report = session.tick(now, &frame, &mut registry);
            for judgement in &report.judgements {
                if let JudgeEvent::Judge {
                    event: Some(event),
                    level,
                    delta_us,
                    ..
                } = judgement
                {
                    debug!(event = event.0, level = level.label(), delta_us, "Judged");
                }
            }
            frames += 1;
            let step = if jitter_us > 0 {
                frame_us + rng.gen_range(-jitter_us..=jitter_us)
            } else {
                frame_us
            };
            clock.advance(step);
        }

        info!(frames, registry_calls = registry.calls().len(), "Simulation finished");
        session.score().clone()
    }
}

/// Load config from file, falling back to defaults if missing or unreadable.
fn load_config(path: &Path) -> GameConfig {
    if !path.exists() {
        info!(path = %path.display(), "Config not found, using defaults");
        return GameConfig::default();
    }
    match GameConfig::read(path) {
        Ok(c) => {
            info!(path = %path.display(), "Loaded game config");
            c
        }
        Err(e) => {
            warn!(path = %path.display(), error = ?e, "Config unreadable, using defaults");
            GameConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("fretline starting");

    info!(path = %args.chart.display(), "Loading chart");
    let chart = ChartDecoder::decode(&args.chart)
        .with_context(|| format!("Failed to load chart {}", args.chart.display()))?;

    let mut config = load_config(&args.config);
    if let Some(offset_ms) = args.offset_ms {
        config.set_user_offset_ms(offset_ms);
    }

    let sim = Simulation {
        fps: args.fps,
        jitter_us: i64::from(args.jitter_ms) * 1000,
        seed: args.seed.unwrap_or_else(rand::random),
    };
    info!(
        song = chart.song_name(),
        events = chart.len(),
        fps = sim.fps,
        seed = sim.seed,
        "Simulating"
    );
    let score = sim.run(Arc::new(chart), config);

    info!(
        perfect = score.perfect,
        good = score.good,
        miss = score.miss,
        max_combo = score.max_combo,
        "Result"
    );
    println!("{}", serde_json::to_string_pretty(&score)?);
    Ok(())
}
