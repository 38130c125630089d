//! Tournament engine — per-round orchestration and the scheduling core.
//!
//! Each round is one pass through:
//!
//! 1. `select_pair` picks two distinct items (pair selector)
//! 2. The external presentation layer obtains a human decision
//! 3. `record_outcome` logs the vote and, for a decided ballot, applies
//!    the rating model and persists both records atomically
//!
//! There is no background scheduling; every operation is a finite,
//! synchronous computation over the current store state.

pub mod selector;
pub mod threshold;
pub mod tournament;

pub use selector::select_pair;
pub use threshold::calculate_threshold;
pub use tournament::{TournamentEngine, TournamentStatistics};
