//! DuelRank Core — crowd-sourced pairwise-comparison tournament engine.
//!
//! A population of items is ranked by repeatedly presenting two items to
//! human judges and updating an Elo-style rating from each outcome. This
//! crate contains the selection-and-rating engine:
//! - Domain types (tournaments, item ratings, ballots, votes)
//! - Pure Elo rating model with phase-dependent K-factors
//! - Dynamic qualification threshold over the qualified population
//! - Pair selector (the scheduling core) with bounded collision retries
//! - Tournament engine orchestration (select → record → persist)
//! - Store contracts (`ItemStore`, `TournamentDirectory`) with in-memory
//!   and JSON-snapshot implementations

pub mod domain;
pub mod engine;
pub mod error;
pub mod phase;
pub mod rating;
pub mod rng;
pub mod stats;
pub mod store;

pub use engine::{TournamentEngine, TournamentStatistics};
pub use error::EngineError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine-facing types are Send + Sync.
    ///
    /// Concurrent voters may drive `record_outcome` from different threads,
    /// so the engine and everything it hands out must cross thread
    /// boundaries. If any type fails this check, the build breaks here.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::TournamentConfig>();
        require_sync::<domain::TournamentConfig>();
        require_send::<domain::ItemRating>();
        require_sync::<domain::ItemRating>();
        require_send::<domain::Ballot>();
        require_sync::<domain::Ballot>();
        require_send::<domain::Vote>();
        require_sync::<domain::Vote>();

        require_send::<store::MemoryStore>();
        require_sync::<store::MemoryStore>();
        require_send::<store::JsonStore>();
        require_sync::<store::JsonStore>();

        require_send::<TournamentEngine<store::MemoryStore>>();
        require_sync::<TournamentEngine<store::MemoryStore>>();

        require_send::<EngineError>();
        require_sync::<EngineError>();
    }
}
