//! Routing priority levels
//!
//! Priority is a multiplier on edge preference, independent of speed.
//! Levels are stored as small integers; the multiplier is `code / 10`, so
//! `Unchanged` is neutral (1.0) and `Best` is 1.5.

use serde::{Deserialize, Serialize};

/// Quantization step of the priority multiplier
pub const PRIORITY_FACTOR: f64 = 0.1;

/// Bits reserved for priority in an encoded edge value
pub const PRIORITY_BITS: u32 = 4;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityCode {
    Exclude = 0,
    ReachDestination = 1,
    VeryBad = 3,
    Bad = 5,
    AvoidMore = 6,
    Avoid = 8,
    SlightAvoid = 9,
    Unchanged = 10,
    SlightPrefer = 11,
    Prefer = 12,
    VeryNice = 13,
    Best = 15,
}

impl PriorityCode {
    pub fn all() -> &'static [PriorityCode] {
        &[
            PriorityCode::Exclude,
            PriorityCode::ReachDestination,
            PriorityCode::VeryBad,
            PriorityCode::Bad,
            PriorityCode::AvoidMore,
            PriorityCode::Avoid,
            PriorityCode::SlightAvoid,
            PriorityCode::Unchanged,
            PriorityCode::SlightPrefer,
            PriorityCode::Prefer,
            PriorityCode::VeryNice,
            PriorityCode::Best,
        ]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Multiplier applied by the weighting
    pub fn factor(self) -> f64 {
        self.code() as f64 * PRIORITY_FACTOR
    }

    pub fn from_u8(v: u8) -> Option<PriorityCode> {
        Self::all().iter().copied().find(|p| p.code() == v)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PriorityCode::Exclude => "exclude",
            PriorityCode::ReachDestination => "reach_destination",
            PriorityCode::VeryBad => "very_bad",
            PriorityCode::Bad => "bad",
            PriorityCode::AvoidMore => "avoid_more",
            PriorityCode::Avoid => "avoid",
            PriorityCode::SlightAvoid => "slight_avoid",
            PriorityCode::Unchanged => "unchanged",
            PriorityCode::SlightPrefer => "slight_prefer",
            PriorityCode::Prefer => "prefer",
            PriorityCode::VeryNice => "very_nice",
            PriorityCode::Best => "best",
        }
    }
}
