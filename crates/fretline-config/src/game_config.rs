use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fretline_rule::JudgeWindows;

use crate::keyboard_config::{ControlMode, KeyboardConfig};

pub const WINDOW_MAX_MS: u32 = 1000;
pub const USER_OFFSET_MAX_MS: i32 = 1000;
pub const USER_OFFSET_MIN_MS: i32 = -1000;
pub const LEAD_TIME_MIN_MS: u32 = 50;
pub const LEAD_TIME_MAX_MS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct GameConfig {
    /// Perfect window, ms either side of the target.
    pub tight_window_ms: u32,
    /// Good window, ms either side of the target.
    pub loose_window_ms: u32,
    /// A long note released this close to its end still succeeds.
    pub hold_release_grace_ms: u32,
    /// How long an unmatched input edge stays buffered.
    pub input_buffer_ms: u32,
    /// Notes and measure lines appear this long before their target time.
    pub lead_time_ms: u32,
    /// Delay between session start and song time 0.
    pub pre_roll_ms: u32,
    pub beats_per_measure: u32,
    /// Player calibration. Positive values move targets later.
    pub user_offset_ms: i32,
    pub control_mode: ControlMode,
    pub keyboard: KeyboardConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tight_window_ms: 22,
            loose_window_ms: 45,
            hold_release_grace_ms: 100,
            input_buffer_ms: 100,
            lead_time_ms: 500,
            pre_roll_ms: 200,
            beats_per_measure: 4,
            user_offset_ms: 0,
            control_mode: ControlMode::Desk,
            keyboard: KeyboardConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&mut self) {
        self.loose_window_ms = self.loose_window_ms.clamp(1, WINDOW_MAX_MS);
        self.tight_window_ms = self.tight_window_ms.min(self.loose_window_ms);
        self.hold_release_grace_ms = self.hold_release_grace_ms.min(WINDOW_MAX_MS);
        self.input_buffer_ms = self.input_buffer_ms.clamp(1, WINDOW_MAX_MS);
        self.lead_time_ms = self.lead_time_ms.clamp(LEAD_TIME_MIN_MS, LEAD_TIME_MAX_MS);
        self.pre_roll_ms = self.pre_roll_ms.min(LEAD_TIME_MAX_MS);
        self.beats_per_measure = self.beats_per_measure.clamp(1, 16);
        self.user_offset_ms = self
            .user_offset_ms
            .clamp(USER_OFFSET_MIN_MS, USER_OFFSET_MAX_MS);
        self.keyboard.validate();
    }

    /// Read config from a JSON file, clamping every field into range.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: GameConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    /// Write config to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn set_user_offset_ms(&mut self, offset_ms: i32) {
        self.user_offset_ms = offset_ms.clamp(USER_OFFSET_MIN_MS, USER_OFFSET_MAX_MS);
    }

    pub fn judge_windows(&self) -> JudgeWindows {
        JudgeWindows::from_millis(self.tight_window_ms, self.loose_window_ms)
    }

    pub fn user_offset_us(&self) -> i64 {
        self.user_offset_ms as i64 * 1000
    }

    pub fn hold_release_grace_us(&self) -> i64 {
        self.hold_release_grace_ms as i64 * 1000
    }

    pub fn input_buffer_us(&self) -> i64 {
        self.input_buffer_ms as i64 * 1000
    }

    pub fn lead_time_us(&self) -> i64 {
        self.lead_time_ms as i64 * 1000
    }

    pub fn pre_roll_us(&self) -> i64 {
        self.pre_roll_ms as i64 * 1000
    }
}
