//! Domain types for DuelRank.

pub mod ballot;
pub mod ids;
pub mod item;
pub mod tournament;

pub use ballot::{Ballot, Vote};
pub use ids::{ItemId, TournamentId, UserId};
pub use item::{ItemRating, INITIAL_RATING};
pub use tournament::{TournamentConfig, TournamentState};
