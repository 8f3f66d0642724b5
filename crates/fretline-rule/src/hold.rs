use fretline_model::{EventId, Lane};

/// Phase of an active long note.
///
/// An empty lane slot is the idle state; a resolved hold is removed from
/// its slot by the judge manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    /// Head was hit and the lane key is expected to stay down.
    Holding,
    /// Released too early; waits for the original end to report failure.
    Broken,
}

/// Result of polling an active hold for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoldStep {
    Waiting,
    Broke,
    Completed,
    Failed,
}

/// A long note whose head was judged not-missed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHold {
    event: EventId,
    lane: Lane,
    start_us: i64,
    /// Effective end; shortened on an on-time release.
    end_us: i64,
    phase: HoldPhase,
}

impl ActiveHold {
    pub fn new(event: EventId, lane: Lane, start_us: i64, end_us: i64) -> Self {
        Self {
            event,
            lane,
            start_us,
            end_us,
            phase: HoldPhase::Holding,
        }
    }

    pub fn event(&self) -> EventId {
        self.event
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    pub fn start_us(&self) -> i64 {
        self.start_us
    }

    pub fn end_us(&self) -> i64 {
        self.end_us
    }

    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    pub fn is_broken(&self) -> bool {
        self.phase == HoldPhase::Broken
    }

    /// Advance the hold with the frame's song time and lane key state.
    ///
    /// A release more than `grace_us` before the end breaks the hold once.
    /// A release inside the grace window moves the effective end to `now_us`,
    /// which completes the hold on the same poll.
    pub(crate) fn update(&mut self, now_us: i64, held: bool, grace_us: i64) -> HoldStep {
        if now_us < self.start_us {
            return HoldStep::Waiting;
        }
        if now_us < self.end_us && !held && self.phase == HoldPhase::Holding {
            if self.end_us.saturating_sub(now_us) > grace_us {
                self.phase = HoldPhase::Broken;
                return HoldStep::Broke;
            }
            self.end_us = now_us;
        }
        if now_us >= self.end_us {
            return match self.phase {
                HoldPhase::Holding => HoldStep::Completed,
                HoldPhase::Broken => HoldStep::Failed,
            };
        }
        HoldStep::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: i64 = 100_000;

    fn hold() -> ActiveHold {
        ActiveHold::new(EventId(0), Lane::new(2).unwrap(), 5_000_000, 7_000_000)
    }

    #[test]
    fn waits_before_start() {
        let mut h = hold();
        assert_eq!(h.update(4_990_000, false, GRACE), HoldStep::Waiting);
        assert!(!h.is_broken());
    }

    #[test]
    fn held_to_end_completes() {
        let mut h = hold();
        assert_eq!(h.update(6_000_000, true, GRACE), HoldStep::Waiting);
        assert_eq!(h.update(7_000_000, true, GRACE), HoldStep::Completed);
    }

    #[test]
    fn release_inside_grace_shortens_end() {
        let mut h = hold();
        assert_eq!(h.update(6_950_000, false, GRACE), HoldStep::Completed);
        assert_eq!(h.end_us(), 6_950_000);
        assert_eq!(h.phase(), HoldPhase::Holding);
    }

    #[test]
    fn early_release_breaks_once_then_fails_at_end() {
        let mut h = hold();
        assert_eq!(h.update(6_500_000, false, GRACE), HoldStep::Broke);
        assert!(h.is_broken());
        assert_eq!(h.update(6_600_000, false, GRACE), HoldStep::Waiting);
        assert_eq!(h.update(6_700_000, true, GRACE), HoldStep::Waiting);
        assert_eq!(h.update(6_999_999, false, GRACE), HoldStep::Waiting);
        assert_eq!(h.end_us(), 7_000_000);
        assert_eq!(h.update(7_000_000, false, GRACE), HoldStep::Failed);
    }

    #[test]
    fn release_exactly_at_grace_boundary_is_on_time() {
        let mut h = hold();
        assert_eq!(h.update(6_900_000, false, GRACE), HoldStep::Completed);
    }
}
