use serde::{Deserialize, Serialize};

use crate::{DEFAULT_LOOSE_US, DEFAULT_TIGHT_US};

/// Judgement outcome.
///
/// `Empty` is the neutral outcome: an input with nothing to judge that
/// must not be penalized (a tap between notes, or any input while the
/// engine is uninitialized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JudgeLevel {
    /// Inside the tight window.
    Perfect,
    /// Inside the loose window.
    Good,
    Miss,
    Empty,
}

impl JudgeLevel {
    /// Whether this level consumes the judged event.
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Perfect | Self::Good)
    }

    /// Text shown by the judgement display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Perfect => "PERFECT",
            Self::Good => "GOOD",
            Self::Miss => "MISS",
            Self::Empty => "",
        }
    }
}

/// The two nested accuracy windows around an event's target time.
///
/// Windows are symmetric: early and late input are judged the same way.
/// Invariant: `0 <= tight_us <= loose_us`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JudgeWindows {
    tight_us: i64,
    loose_us: i64,
}

impl JudgeWindows {
    /// Create windows; negative values are taken by magnitude and the tight
    /// window is clamped so it never exceeds the loose one.
    pub fn new(tight_us: i64, loose_us: i64) -> Self {
        let loose_us = loose_us.abs();
        let tight_us = tight_us.abs().min(loose_us);
        Self { tight_us, loose_us }
    }

    pub fn from_millis(tight_ms: u32, loose_ms: u32) -> Self {
        Self::new(tight_ms as i64 * 1000, loose_ms as i64 * 1000)
    }

    pub fn tight_us(&self) -> i64 {
        self.tight_us
    }

    pub fn loose_us(&self) -> i64 {
        self.loose_us
    }

    /// Classify `delta_us = input_song_time - target_time` (positive = late).
    pub fn judge(&self, delta_us: i64) -> JudgeLevel {
        let abs = delta_us.saturating_abs();
        if abs <= self.tight_us {
            JudgeLevel::Perfect
        } else if abs <= self.loose_us {
            JudgeLevel::Good
        } else {
            JudgeLevel::Miss
        }
    }

    /// Whether an event this late can no longer be hit.
    pub fn is_expired(&self, lateness_us: i64) -> bool {
        lateness_us > self.loose_us
    }
}

impl Default for JudgeWindows {
    fn default() -> Self {
        Self::new(DEFAULT_TIGHT_US, DEFAULT_LOOSE_US)
    }
}
