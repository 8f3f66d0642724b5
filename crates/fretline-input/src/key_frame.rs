use fretline_model::{LANE_COUNT, Lane};

/// Key state sampled once per frame.
///
/// `held` is the level state of each lane key; the `*_pressed` fields are
/// press edges observed since the previous sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyFrame {
    pub held: [bool; LANE_COUNT],
    pub lane_pressed: [bool; LANE_COUNT],
    pub stroke_pressed: bool,
    pub mode_toggled: bool,
}

impl KeyFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lane key held down this frame.
    pub fn with_held(mut self, lane: Lane) -> Self {
        self.held[lane.index()] = true;
        self
    }

    /// Lane key pressed this frame. A pressed key is also held.
    pub fn with_press(mut self, lane: Lane) -> Self {
        self.lane_pressed[lane.index()] = true;
        self.held[lane.index()] = true;
        self
    }

    pub fn with_stroke(mut self) -> Self {
        self.stroke_pressed = true;
        self
    }

    pub fn is_held(&self, lane: Lane) -> bool {
        self.held[lane.index()]
    }

    pub fn held_lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        Lane::all().filter(|lane| self.held[lane.index()])
    }

    pub fn pressed_lanes(&self) -> impl Iterator<Item = Lane> + '_ {
        Lane::all().filter(|lane| self.lane_pressed[lane.index()])
    }

    pub fn any_held(&self) -> bool {
        self.held.iter().any(|&h| h)
    }

    /// No edge and no held key.
    pub fn is_idle(&self) -> bool {
        !self.any_held() && !self.stroke_pressed && !self.mode_toggled
    }
}
