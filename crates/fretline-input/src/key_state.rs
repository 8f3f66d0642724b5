/// Raw key state tracking.
///
/// Holds the on/off state and last change time of every keycode, used for
/// press-edge detection and debounce.
#[derive(Debug, Clone)]
pub struct KeyStateManager {
    keystate: [bool; Self::SIZE],
    time: [i64; Self::SIZE],
}

impl KeyStateManager {
    pub const SIZE: usize = 256;
    pub const TIME_NOT_SET: i64 = i64::MIN;

    pub fn new() -> Self {
        Self {
            keystate: [false; Self::SIZE],
            time: [Self::TIME_NOT_SET; Self::SIZE],
        }
    }

    fn slot(keycode: i32) -> Option<usize> {
        usize::try_from(keycode).ok().filter(|&k| k < Self::SIZE)
    }

    /// Record a new state for `keycode`.
    ///
    /// Returns `true` when this is a press edge (off to on). Changes arriving
    /// within `debounce_us` of the previous change are ignored.
    pub fn update(&mut self, keycode: i32, pressed: bool, now_us: i64, debounce_us: i64) -> bool {
        let Some(k) = Self::slot(keycode) else {
            return false;
        };
        if pressed == self.keystate[k] || now_us < self.time[k].saturating_add(debounce_us) {
            return false;
        }
        self.keystate[k] = pressed;
        self.time[k] = now_us;
        pressed
    }

    /// Whether a key is currently pressed. `false` for out-of-range keycodes.
    pub fn is_pressed(&self, keycode: i32) -> bool {
        Self::slot(keycode).is_some_and(|k| self.keystate[k])
    }

    /// Reset all key states to unpressed and all timestamps to `TIME_NOT_SET`.
    pub fn reset_all(&mut self) {
        self.keystate.fill(false);
        self.time.fill(Self::TIME_NOT_SET);
    }
}

impl Default for KeyStateManager {
    fn default() -> Self {
        Self::new()
    }
}
