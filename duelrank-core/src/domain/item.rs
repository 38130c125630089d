use super::ids::ItemId;
use serde::{Deserialize, Serialize};

/// Rating every item starts at, and returns to on tournament reset.
pub const INITIAL_RATING: f64 = 1500.0;

/// One item's rating record within a tournament.
///
/// Mutated exactly once per recorded match outcome (both members of the
/// compared pair). Invariant: `wins <= matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRating {
    pub item: ItemId,
    pub rating: f64,
    pub matches: u32,
    pub wins: u32,
}

impl ItemRating {
    /// Fresh record at the initial rating with zeroed counters.
    pub fn new(item: ItemId) -> Self {
        Self::with_rating(item, INITIAL_RATING)
    }

    pub fn with_rating(item: ItemId, rating: f64) -> Self {
        Self {
            item,
            rating,
            matches: 0,
            wins: 0,
        }
    }

    /// Fraction of matches won; 0.0 for an unplayed item.
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.matches)
        }
    }
}
