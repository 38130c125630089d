//! Tournament engine orchestration.

use crate::domain::{Ballot, ItemId, ItemRating, TournamentConfig, Vote, INITIAL_RATING};
use crate::error::EngineError;
use crate::rating;
use crate::store::{ItemStore, TournamentDirectory};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::selector;
use super::threshold::calculate_threshold;

/// Histogram bin width for the rating distribution snapshot.
const DISTRIBUTION_BIN: f64 = 20.0;

/// Read-only observability snapshot. Computing it never mutates state, so
/// two calls without an intervening outcome are identical (modulo the
/// retry counter, which only selection moves).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentStatistics {
    /// Current viability cutoff; `-inf` (JSON: null) while the qualified
    /// population is still smaller than `top_n`.
    pub threshold: f64,
    pub above_threshold: usize,
    pub unqualified: usize,
    /// Item counts bucketed by rating, keyed by bucket floor.
    pub distribution: BTreeMap<i64, usize>,
    pub total_matches: u64,
    pub total_wins: u64,
    pub retries: u64,
}

/// Per-tournament orchestrator: select → (external decision) → record.
///
/// Owns the collision-retry counter — an explicit field reset only at
/// construction, never process-global state.
pub struct TournamentEngine<S> {
    store: Arc<S>,
    config: TournamentConfig,
    retries: AtomicU64,
}

impl<S> std::fmt::Debug for TournamentEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TournamentEngine")
            .field("config", &self.config)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl<S: ItemStore> TournamentEngine<S> {
    pub fn new(store: Arc<S>, config: TournamentConfig) -> Self {
        Self {
            store,
            config,
            retries: AtomicU64::new(0),
        }
    }

    /// Engine for the single active tournament.
    ///
    /// The exactly-one-active invariant is checked here, at the boundary
    /// with the configuration collaborator; zero or multiple active
    /// tournaments is a configuration error, not something to guess
    /// around.
    pub fn for_active<D: TournamentDirectory>(
        store: Arc<S>,
        directory: &D,
    ) -> Result<Self, EngineError> {
        let mut active = directory.active()?;
        if active.len() != 1 {
            return Err(EngineError::ActiveTournament {
                found: active.len(),
            });
        }
        Ok(Self::new(store, active.remove(0)))
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// Collision retries since this engine was constructed.
    pub fn retry_count(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Two distinct items for the next round.
    pub fn select_pair(&self) -> Result<(ItemId, ItemId), EngineError> {
        selector::select_pair(self.store.as_ref(), &self.config, &self.retries)
    }

    /// Log the ballot and, if a winner was picked, apply the rating model
    /// and persist both updated records as one atomic write.
    ///
    /// A no-preference ballot still lands in the vote log (audit trail)
    /// but touches no rating, match, or win counter.
    pub fn record_outcome(&self, ballot: &Ballot) -> Result<(), EngineError> {
        if let Some(selected) = ballot.selected {
            if selected != ballot.first && selected != ballot.second {
                return Err(EngineError::OutcomeMismatch {
                    selected,
                    first: ballot.first,
                    second: ballot.second,
                });
            }
        }

        self.store
            .append_vote(&Vote::from_ballot(self.config.id, ballot))?;

        if let Some((winner_id, loser_id)) = ballot.decision() {
            // One serialized read-modify-write: a concurrent outcome on an
            // overlapping pair cannot overwrite this one's counters.
            let (winner, _) = self.store.update_pair(
                self.config.id,
                winner_id,
                loser_id,
                &|winner, loser| rating::apply_outcome(winner, loser, &self.config),
            )?;
            tracing::debug!(
                winner = %winner_id,
                loser = %loser_id,
                new_winner_rating = winner.rating,
                "recorded outcome"
            );
        }
        Ok(())
    }

    /// Current viability cutoff (see [`calculate_threshold`]).
    pub fn threshold(&self) -> Result<f64, EngineError> {
        calculate_threshold(self.store.as_ref(), &self.config)
    }

    /// Observability snapshot; read-only.
    pub fn statistics(&self) -> Result<TournamentStatistics, EngineError> {
        let threshold = self.threshold()?;
        let above_threshold = self.store.count_at_or_above(self.config.id, threshold)?;
        let unqualified = self
            .store
            .count_unqualified(self.config.id, self.config.initial_phase_matches)?;
        let distribution = self
            .store
            .rating_distribution(self.config.id, DISTRIBUTION_BIN)?;
        let (total_matches, total_wins) = self.store.match_totals(self.config.id)?;

        Ok(TournamentStatistics {
            threshold,
            above_threshold,
            unqualified,
            distribution,
            total_matches,
            total_wins,
            retries: self.retry_count(),
        })
    }

    /// Leaderboard: top `n` records by rating, descending.
    pub fn top_items(&self, n: usize) -> Result<Vec<ItemRating>, EngineError> {
        Ok(self.store.top_items(self.config.id, n)?)
    }

    /// Restore every record to the initial rating with zeroed counters.
    /// Used to re-run a tournament; not part of the per-round hot path.
    pub fn reset(&self) -> Result<(), EngineError> {
        tracing::info!(tournament = %self.config.id, "resetting tournament ratings");
        Ok(self.store.reset(self.config.id, INITIAL_RATING)?)
    }
}
