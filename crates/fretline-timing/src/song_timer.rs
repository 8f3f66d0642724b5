use tracing::debug;

/// Maps audio clock readings to song time and back.
///
/// `song_time = clock - song_start - (chart_offset + user_offset)`.
/// Nothing is cached: every conversion uses the clock reading it is given,
/// so the result does not depend on frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongTimer {
    song_start_us: i64,
    chart_offset_us: i64,
    user_offset_us: i64,
}

impl SongTimer {
    pub fn new(song_start_us: i64, chart_offset_us: i64) -> Self {
        Self {
            song_start_us,
            chart_offset_us,
            user_offset_us: 0,
        }
    }

    pub fn song_start_us(&self) -> i64 {
        self.song_start_us
    }

    pub fn user_offset_us(&self) -> i64 {
        self.user_offset_us
    }

    /// Apply the user calibration offset. May change between frames.
    pub fn set_user_offset_us(&mut self, offset_us: i64) {
        if offset_us != self.user_offset_us {
            debug!(offset_us, "User offset changed");
        }
        self.user_offset_us = offset_us;
    }

    /// Chart offset plus user calibration offset.
    pub fn total_offset_us(&self) -> i64 {
        self.chart_offset_us.saturating_add(self.user_offset_us)
    }

    /// Song time at the given clock reading.
    pub fn song_time_us(&self, clock_us: i64) -> i64 {
        clock_us
            .saturating_sub(self.song_start_us)
            .saturating_sub(self.total_offset_us())
    }

    /// Clock reading at which the given song time occurs.
    pub fn clock_time_us(&self, song_time_us: i64) -> i64 {
        self.song_start_us
            .saturating_add(song_time_us)
            .saturating_add(self.total_offset_us())
    }
}
