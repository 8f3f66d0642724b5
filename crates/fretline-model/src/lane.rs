use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of playable lanes (one per string).
pub const LANE_COUNT: usize = 6;

/// A playable lane, numbered 1..=LANE_COUNT as in chart files.
///
/// Per-lane state is stored in `[T; LANE_COUNT]` arrays indexed by
/// [`Lane::index`], so lane arithmetic only happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Lane(u8);

impl Lane {
    /// Create a lane from its 1-based number. Returns `None` when out of range.
    pub fn new(number: u8) -> Option<Self> {
        if (1..=LANE_COUNT as u8).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Create a lane from a 0-based array index.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < LANE_COUNT {
            Some(Self(index as u8 + 1))
        } else {
            None
        }
    }

    /// 1-based lane number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-based index into per-lane arrays.
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }

    /// All lanes in ascending order.
    pub fn all() -> impl Iterator<Item = Lane> {
        (1..=LANE_COUNT as u8).map(Lane)
    }
}

impl TryFrom<u8> for Lane {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Lane::new(number).ok_or_else(|| format!("lane {number} out of range 1..={LANE_COUNT}"))
    }
}

impl From<Lane> for u8 {
    fn from(lane: Lane) -> Self {
        lane.0
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lane an event or an input is bound to.
///
/// `Any` is the whole-lane sentinel used by mute events and by strokes
/// made while no lane key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaneTarget {
    Any,
    Lane(Lane),
}

impl LaneTarget {
    pub fn lane(self) -> Option<Lane> {
        match self {
            Self::Any => None,
            Self::Lane(lane) => Some(lane),
        }
    }

    pub fn is_any(self) -> bool {
        matches!(self, Self::Any)
    }
}

impl From<Lane> for LaneTarget {
    fn from(lane: Lane) -> Self {
        Self::Lane(lane)
    }
}

impl fmt::Display for LaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Lane(lane) => write!(f, "{lane}"),
        }
    }
}
