//! Store contracts and structured error types.
//!
//! The engine consumes ratings through the `ItemStore` trait and tournament
//! configuration through `TournamentDirectory`, so the backing store can be
//! swapped (in-memory for tests, JSON snapshot for operator tooling, a
//! relational database behind the same contract in a larger deployment).
//!
//! The central contract is `sample`: "uniform random item satisfying the
//! filter". Implementations may count-then-offset, reservoir-sample, or
//! push the filter into a query engine; the engine never materializes a
//! filtered pool itself.

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::domain::{ItemId, ItemRating, TournamentConfig, TournamentId, TournamentState, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("item {item} has no rating record in tournament {tournament}")]
    ItemNotFound {
        tournament: TournamentId,
        item: ItemId,
    },

    #[error("tournament {0} already exists")]
    TournamentExists(TournamentId),

    #[error("rank {rank} is out of range for {available} qualified items")]
    RankOutOfRange { rank: usize, available: usize },

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filter for a uniform random draw. All bounds are inclusive; `None`
/// means unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleFilter {
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub max_matches: Option<u32>,
    /// Never return this item (used for the banded second draw).
    pub exclude: Option<ItemId>,
}

impl SampleFilter {
    /// Unconstrained draw over the whole population.
    pub fn any() -> Self {
        Self::default()
    }

    /// Items still below the qualification cutoff.
    pub fn unqualified(initial_phase_matches: u32) -> Self {
        Self {
            max_matches: Some(initial_phase_matches.saturating_sub(1)),
            ..Self::default()
        }
    }

    /// Items rated at or above `threshold`.
    pub fn at_or_above(threshold: f64) -> Self {
        Self {
            min_rating: Some(threshold),
            ..Self::default()
        }
    }

    pub(crate) fn admits(&self, record: &ItemRating) -> bool {
        if let Some(min) = self.min_rating {
            if record.rating < min {
                return false;
            }
        }
        if let Some(max) = self.max_rating {
            if record.rating > max {
                return false;
            }
        }
        if let Some(max) = self.max_matches {
            if record.matches > max {
                return false;
            }
        }
        if self.exclude == Some(record.item) {
            return false;
        }
        true
    }
}

/// Count and rating spread of the qualified sub-population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualifiedStats {
    pub count: usize,
    /// Population standard deviation of qualified ratings; 0.0 when the
    /// set is empty or a single item.
    pub std_dev: f64,
}

/// Rating records for one tournament, plus the append-only vote log.
pub trait ItemStore: Send + Sync {
    /// Uniform random record satisfying `filter`; `None` if nothing matches.
    fn sample(
        &self,
        tournament: TournamentId,
        filter: &SampleFilter,
    ) -> Result<Option<ItemRating>, StoreError>;

    fn get(&self, tournament: TournamentId, item: ItemId) -> Result<ItemRating, StoreError>;

    /// Bulk-create one record per item at `initial_rating`.
    fn create_items(
        &self,
        tournament: TournamentId,
        items: &[ItemId],
        initial_rating: f64,
    ) -> Result<(), StoreError>;

    /// Persist both sides of a round as one atomic write — either both
    /// records land or neither does.
    fn put_pair(
        &self,
        tournament: TournamentId,
        a: &ItemRating,
        b: &ItemRating,
    ) -> Result<(), StoreError>;

    /// Read-modify-write both records as one serialized unit: load the
    /// current pair, run `apply` on it, and write the result back without
    /// any other writer interleaving. Two concurrent calls sharing an
    /// item observe each other's updates. Returns the written pair.
    fn update_pair(
        &self,
        tournament: TournamentId,
        a: ItemId,
        b: ItemId,
        apply: &dyn Fn(&ItemRating, &ItemRating) -> (ItemRating, ItemRating),
    ) -> Result<(ItemRating, ItemRating), StoreError>;

    /// Count and population std-dev of items with `matches >= cutoff`.
    fn qualified_stats(
        &self,
        tournament: TournamentId,
        cutoff: u32,
    ) -> Result<QualifiedStats, StoreError>;

    /// Rating at `rank` (1-indexed, descending) among qualified items.
    fn rating_at_rank(
        &self,
        tournament: TournamentId,
        cutoff: u32,
        rank: usize,
    ) -> Result<f64, StoreError>;

    fn count_unqualified(&self, tournament: TournamentId, cutoff: u32)
        -> Result<usize, StoreError>;

    fn count_at_or_above(
        &self,
        tournament: TournamentId,
        threshold: f64,
    ) -> Result<usize, StoreError>;

    /// Histogram of ratings bucketed to `bin_width`, keyed by bucket floor.
    fn rating_distribution(
        &self,
        tournament: TournamentId,
        bin_width: f64,
    ) -> Result<BTreeMap<i64, usize>, StoreError>;

    /// `(total matches, total wins)` across the tournament.
    fn match_totals(&self, tournament: TournamentId) -> Result<(u64, u64), StoreError>;

    /// Top `n` records by rating, descending.
    fn top_items(&self, tournament: TournamentId, n: usize)
        -> Result<Vec<ItemRating>, StoreError>;

    fn append_vote(&self, vote: &Vote) -> Result<(), StoreError>;

    /// Every record back to `initial_rating` with zeroed counters.
    fn reset(&self, tournament: TournamentId, initial_rating: f64) -> Result<(), StoreError>;
}

/// Tournament configuration lookup and lifecycle.
pub trait TournamentDirectory: Send + Sync {
    fn create(&self, config: &TournamentConfig) -> Result<(), StoreError>;

    fn set_state(
        &self,
        tournament: TournamentId,
        state: TournamentState,
    ) -> Result<(), StoreError>;

    /// All tournaments currently in the `Active` state.
    ///
    /// The engine's exactly-one-active precondition is checked against the
    /// length of this list at the engine boundary, not inside selection.
    fn active(&self) -> Result<Vec<TournamentConfig>, StoreError>;
}
