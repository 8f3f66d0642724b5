// Judge windows, judgement engine, hold tracking and score tally

mod hold;
pub mod judge_manager;
mod judge_window;
mod registry;
mod score_data;

pub use hold::{ActiveHold, HoldPhase};
pub use judge_manager::{EdgeKind, JudgeConfig, JudgeEvent, JudgeManager, Resolution};
pub use judge_window::{JudgeLevel, JudgeWindows};
pub use registry::{NullRegistry, RecordingRegistry, RegistryCall, VisualRegistry};
pub use score_data::ScoreData;

/// Default tight (perfect) window in microseconds.
pub const DEFAULT_TIGHT_US: i64 = 22_000;
/// Default loose (good) window in microseconds.
pub const DEFAULT_LOOSE_US: i64 = 45_000;
/// Default early-release grace for long notes in microseconds.
pub const DEFAULT_RELEASE_GRACE_US: i64 = 100_000;
