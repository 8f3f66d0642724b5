use serde::{Deserialize, Serialize};

/// Keycodes of the windowing backend (libGDX `Input.Keys` numbering).
pub mod gdx_keys {
    pub const NUM_1: i32 = 8;
    pub const NUM_2: i32 = 9;
    pub const NUM_3: i32 = 10;
    pub const NUM_4: i32 = 11;
    pub const NUM_5: i32 = 12;
    pub const NUM_6: i32 = 13;
    pub const E: i32 = 33;
    pub const Q: i32 = 45;
    pub const R: i32 = 46;
    pub const T: i32 = 48;
    pub const W: i32 = 51;
    pub const Y: i32 = 53;
    pub const SHIFT_RIGHT: i32 = 60;
    pub const TAB: i32 = 61;
    pub const SPACE: i32 = 62;
    pub const ENTER: i32 = 66;
    pub const NUMPAD_ENTER: i32 = 160;
}

/// Highest keycode a key map may use.
pub const MAX_KEYCODE: i32 = 255;

/// Physical layout the player is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlMode {
    /// Lane keys on the letter row, stroke on Space.
    #[default]
    Desk,
    /// Lane keys on the number row, stroke on Right-Shift or Enter.
    Performance,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Desk => Self::Performance,
            Self::Performance => Self::Desk,
        }
    }
}

/// Lane and stroke keycodes for one control mode. `-1` leaves a lane unbound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMap {
    pub lanes: [i32; 6],
    pub strokes: Vec<i32>,
}

impl KeyMap {
    pub fn desk() -> Self {
        use gdx_keys::*;
        Self {
            lanes: [Y, T, R, E, W, Q],
            strokes: vec![SPACE],
        }
    }

    pub fn performance() -> Self {
        use gdx_keys::*;
        Self {
            lanes: [NUM_1, NUM_2, NUM_3, NUM_4, NUM_5, NUM_6],
            strokes: vec![SHIFT_RIGHT, ENTER, NUMPAD_ENTER],
        }
    }

    fn validate(&mut self) {
        for key in &mut self.lanes {
            if !(0..=MAX_KEYCODE).contains(key) {
                *key = -1;
            }
        }
        self.strokes.retain(|k| (0..=MAX_KEYCODE).contains(k));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct KeyboardConfig {
    pub desk: KeyMap,
    pub performance: KeyMap,
    /// Switches between desk and performance layouts.
    pub mode_toggle: i32,
    /// Lane key debounce in milliseconds.
    pub duration: i32,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            desk: KeyMap::desk(),
            performance: KeyMap::performance(),
            mode_toggle: gdx_keys::TAB,
            duration: 0,
        }
    }
}

impl KeyboardConfig {
    pub fn key_map(&self, mode: ControlMode) -> &KeyMap {
        match mode {
            ControlMode::Desk => &self.desk,
            ControlMode::Performance => &self.performance,
        }
    }

    pub fn validate(&mut self) {
        self.desk.validate();
        self.performance.validate();
        if self.desk.strokes.is_empty() {
            self.desk.strokes = KeyMap::desk().strokes;
        }
        if self.performance.strokes.is_empty() {
            self.performance.strokes = KeyMap::performance().strokes;
        }
        if !(0..=MAX_KEYCODE).contains(&self.mode_toggle) {
            self.mode_toggle = gdx_keys::TAB;
        }
        self.duration = self.duration.clamp(0, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layouts() {
        let kc = KeyboardConfig::default();
        assert_eq!(kc.desk.lanes[0], gdx_keys::Y);
        assert_eq!(kc.desk.lanes[5], gdx_keys::Q);
        assert_eq!(kc.desk.strokes, vec![gdx_keys::SPACE]);
        assert_eq!(kc.performance.lanes[2], gdx_keys::NUM_3);
        assert_eq!(kc.performance.strokes.len(), 3);
        assert_eq!(kc.mode_toggle, gdx_keys::TAB);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(ControlMode::Desk.toggled(), ControlMode::Performance);
        assert_eq!(ControlMode::Performance.toggled(), ControlMode::Desk);
    }

    #[test]
    fn test_validate_normalizes_keys() {
        let mut kc = KeyboardConfig::default();
        kc.desk.lanes[1] = 999;
        kc.performance.strokes = vec![-5];
        kc.mode_toggle = -1;
        kc.duration = 500;
        kc.validate();
        assert_eq!(kc.desk.lanes[1], -1);
        assert_eq!(kc.performance.strokes, KeyMap::performance().strokes);
        assert_eq!(kc.mode_toggle, gdx_keys::TAB);
        assert_eq!(kc.duration, 100);
    }
}
