//! Engine error taxonomy.

use crate::domain::ItemId;
use crate::store::StoreError;
use thiserror::Error;

/// Errors from the tournament engine.
///
/// Nothing here is silently swallowed: configuration errors are fatal to
/// the current operation, pool errors surface so the orchestration layer
/// can decide whether to widen filters or abort the round. Statistics on
/// merely sparse data return defined values instead of raising.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The directory's exactly-one-active invariant is violated.
    #[error("expected exactly one active tournament, found {found}")]
    ActiveTournament { found: usize },

    /// A filtered random draw found zero eligible items.
    #[error("no eligible item in the {pool} pool")]
    EmptyPool { pool: &'static str },

    /// Collision retries exhausted — the eligible pool is effectively a
    /// single item and redrawing cannot terminate.
    #[error("pair selection kept colliding after {attempts} attempts; eligible pool too small")]
    DegeneratePool { attempts: u64 },

    /// A ballot selected an item outside its own pair.
    #[error("selected item {selected} is not part of the compared pair ({first}, {second})")]
    OutcomeMismatch {
        selected: ItemId,
        first: ItemId,
        second: ItemId,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
