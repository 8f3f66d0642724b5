use std::cell::Cell;
use std::time::Instant;

/// Abstraction over the audio hardware clock.
///
/// All judgement is driven by this clock, never by frame deltas.
/// Implementations: [`SystemClock`] (monotonic fallback), [`ManualClock`] (testing
/// and headless simulation).
pub trait AudioClock {
    /// Current clock reading in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;
}

/// Monotonic clock based on `std::time::Instant`.
///
/// Stands in for the audio device clock when the audio backend does not
/// expose one.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemClock {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Manually driven clock for deterministic tests and simulation.
pub struct ManualClock {
    current_us: Cell<i64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(us: i64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    pub fn set_time(&self, us: i64) {
        self.current_us.set(us);
    }

    pub fn advance(&self, delta_us: i64) {
        self.current_us.set(self.current_us.get() + delta_us);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for ManualClock {
    fn now_us(&self) -> i64 {
        self.current_us.get()
    }
}

impl<C: AudioClock + ?Sized> AudioClock for &C {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}
