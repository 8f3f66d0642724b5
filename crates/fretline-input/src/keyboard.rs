//! Keyboard input processing.
//!
//! Polls keyboard state via a `KeyboardBackend` trait, applies debounce to
//! lane keys and produces one [`KeyFrame`] per poll for the active control
//! mode.

use std::collections::HashSet;

use fretline_config::{ControlMode, KeyboardConfig};
use tracing::info;

use crate::key_frame::KeyFrame;
use crate::key_state::KeyStateManager;

/// Platform abstraction for keyboard state queries.
pub trait KeyboardBackend {
    /// Returns `true` if the given raw keycode is currently pressed.
    fn is_key_pressed(&self, keycode: i32) -> bool;
}

/// Virtual keyboard backend for testing and headless runs.
#[derive(Debug, Default)]
pub struct VirtualKeyboardBackend {
    pressed: HashSet<i32>,
}

impl VirtualKeyboardBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, keycode: i32) {
        self.pressed.insert(keycode);
    }

    pub fn release(&mut self, keycode: i32) {
        self.pressed.remove(&keycode);
    }

    pub fn release_all(&mut self) {
        self.pressed.clear();
    }
}

impl KeyboardBackend for VirtualKeyboardBackend {
    fn is_key_pressed(&self, keycode: i32) -> bool {
        self.pressed.contains(&keycode)
    }
}

pub struct KeyboardInput {
    config: KeyboardConfig,
    mode: ControlMode,
    keys: KeyStateManager,
    /// Lane key debounce in microseconds.
    duration_us: i64,
}

impl KeyboardInput {
    pub fn new(config: &KeyboardConfig, mode: ControlMode) -> Self {
        Self {
            config: config.clone(),
            mode,
            keys: KeyStateManager::new(),
            duration_us: config.duration as i64 * 1000,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Poll the backend and return this frame's key snapshot.
    ///
    /// A press of the mode-toggle key switches layouts; the new layout is
    /// read from the next poll on.
    pub fn poll(&mut self, now_us: i64, backend: &dyn KeyboardBackend) -> KeyFrame {
        let mut frame = KeyFrame::new();
        let map = self.config.key_map(self.mode);

        for (index, &key) in map.lanes.iter().enumerate() {
            if key < 0 {
                continue;
            }
            let pressed = backend.is_key_pressed(key);
            if self.keys.update(key, pressed, now_us, self.duration_us) {
                frame.lane_pressed[index] = true;
            }
            frame.held[index] = self.keys.is_pressed(key);
        }

        for &key in &map.strokes {
            let pressed = backend.is_key_pressed(key);
            if self.keys.update(key, pressed, now_us, 0) {
                frame.stroke_pressed = true;
            }
        }

        let toggle = self.config.mode_toggle;
        if self.keys.update(toggle, backend.is_key_pressed(toggle), now_us, 0) {
            self.mode = self.mode.toggled();
            self.keys.reset_all();
            // Keep the toggle key down so holding it does not re-toggle.
            self.keys.update(toggle, true, now_us, 0);
            frame.mode_toggled = true;
            info!(mode = ?self.mode, "Control mode switched");
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fretline_config::gdx_keys;
    use fretline_model::Lane;

    fn lane(n: u8) -> Lane {
        Lane::new(n).unwrap()
    }

    fn input() -> KeyboardInput {
        KeyboardInput::new(&KeyboardConfig::default(), ControlMode::Desk)
    }

    #[test]
    fn lane_press_edge_then_held() {
        let mut kb = input();
        let mut backend = VirtualKeyboardBackend::new();
        backend.press(gdx_keys::R);

        let f = kb.poll(0, &backend);
        assert!(f.lane_pressed[lane(3).index()]);
        assert!(f.is_held(lane(3)));

        let f = kb.poll(16_000, &backend);
        assert!(!f.lane_pressed[lane(3).index()]);
        assert!(f.is_held(lane(3)));

        backend.release(gdx_keys::R);
        let f = kb.poll(32_000, &backend);
        assert!(!f.is_held(lane(3)));
    }

    #[test]
    fn stroke_edge_only_on_press() {
        let mut kb = input();
        let mut backend = VirtualKeyboardBackend::new();
        backend.press(gdx_keys::SPACE);
        assert!(kb.poll(0, &backend).stroke_pressed);
        assert!(!kb.poll(10_000, &backend).stroke_pressed);
        backend.release(gdx_keys::SPACE);
        kb.poll(20_000, &backend);
        backend.press(gdx_keys::SPACE);
        assert!(kb.poll(30_000, &backend).stroke_pressed);
    }

    #[test]
    fn performance_layout_ignores_desk_keys() {
        let mut kb = KeyboardInput::new(&KeyboardConfig::default(), ControlMode::Performance);
        let mut backend = VirtualKeyboardBackend::new();
        backend.press(gdx_keys::Y);
        backend.press(gdx_keys::SPACE);
        assert!(kb.poll(0, &backend).is_idle());

        backend.release_all();
        backend.press(gdx_keys::NUM_6);
        backend.press(gdx_keys::ENTER);
        let f = kb.poll(10_000, &backend);
        assert!(f.is_held(lane(6)));
        assert!(f.stroke_pressed);
    }

    #[test]
    fn toggle_switches_mode_once_per_press() {
        let mut kb = input();
        let mut backend = VirtualKeyboardBackend::new();
        backend.press(gdx_keys::TAB);
        assert!(kb.poll(0, &backend).mode_toggled);
        assert_eq!(kb.mode(), ControlMode::Performance);
        assert!(!kb.poll(10_000, &backend).mode_toggled);
        assert_eq!(kb.mode(), ControlMode::Performance);

        backend.release(gdx_keys::TAB);
        kb.poll(20_000, &backend);
        backend.press(gdx_keys::TAB);
        kb.poll(30_000, &backend);
        assert_eq!(kb.mode(), ControlMode::Desk);
    }

    #[test]
    fn debounce_applies_to_lanes() {
        let mut config = KeyboardConfig::default();
        config.duration = 20;
        let mut kb = KeyboardInput::new(&config, ControlMode::Desk);
        let mut backend = VirtualKeyboardBackend::new();
        backend.press(gdx_keys::Y);
        assert!(kb.poll(0, &backend).lane_pressed[0]);
        backend.release(gdx_keys::Y);
        assert!(kb.poll(5_000, &backend).held[0]);
        backend.press(gdx_keys::Y);
        assert!(!kb.poll(10_000, &backend).lane_pressed[0]);
    }
}
