//! JSON-snapshot store.
//!
//! `MemoryStore` semantics plus a snapshot file rewritten after every
//! mutation. Writes are atomic: serialize to `.tmp`, then rename into
//! place. This is operator tooling for small populations, not a database
//! — a real deployment puts a relational store behind the same traits.

use super::memory::{MemoryStore, StoreSnapshot};
use super::{ItemStore, QualifiedStats, SampleFilter, StoreError, TournamentDirectory};
use crate::domain::{
    ItemId, ItemRating, TournamentConfig, TournamentId, TournamentState, Vote,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open the store at `path`, loading the existing snapshot if present.
    pub fn open(path: impl Into<PathBuf>, seed: u64) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = if path.exists() {
            let bytes = fs::read(&path)?;
            let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
            MemoryStore::from_snapshot(snapshot, seed)
        } else {
            MemoryStore::with_seed(seed)
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn vote_count(&self) -> usize {
        self.inner.vote_count()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.inner.snapshot();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ItemStore for JsonStore {
    fn sample(
        &self,
        tournament: TournamentId,
        filter: &SampleFilter,
    ) -> Result<Option<ItemRating>, StoreError> {
        self.inner.sample(tournament, filter)
    }

    fn get(&self, tournament: TournamentId, item: ItemId) -> Result<ItemRating, StoreError> {
        self.inner.get(tournament, item)
    }

    fn create_items(
        &self,
        tournament: TournamentId,
        items: &[ItemId],
        initial_rating: f64,
    ) -> Result<(), StoreError> {
        self.inner.create_items(tournament, items, initial_rating)?;
        self.persist()
    }

    fn put_pair(
        &self,
        tournament: TournamentId,
        a: &ItemRating,
        b: &ItemRating,
    ) -> Result<(), StoreError> {
        self.inner.put_pair(tournament, a, b)?;
        self.persist()
    }

    fn update_pair(
        &self,
        tournament: TournamentId,
        a: ItemId,
        b: ItemId,
        apply: &dyn Fn(&ItemRating, &ItemRating) -> (ItemRating, ItemRating),
    ) -> Result<(ItemRating, ItemRating), StoreError> {
        let pair = self.inner.update_pair(tournament, a, b, apply)?;
        self.persist()?;
        Ok(pair)
    }

    fn qualified_stats(
        &self,
        tournament: TournamentId,
        cutoff: u32,
    ) -> Result<QualifiedStats, StoreError> {
        self.inner.qualified_stats(tournament, cutoff)
    }

    fn rating_at_rank(
        &self,
        tournament: TournamentId,
        cutoff: u32,
        rank: usize,
    ) -> Result<f64, StoreError> {
        self.inner.rating_at_rank(tournament, cutoff, rank)
    }

    fn count_unqualified(
        &self,
        tournament: TournamentId,
        cutoff: u32,
    ) -> Result<usize, StoreError> {
        self.inner.count_unqualified(tournament, cutoff)
    }

    fn count_at_or_above(
        &self,
        tournament: TournamentId,
        threshold: f64,
    ) -> Result<usize, StoreError> {
        self.inner.count_at_or_above(tournament, threshold)
    }

    fn rating_distribution(
        &self,
        tournament: TournamentId,
        bin_width: f64,
    ) -> Result<BTreeMap<i64, usize>, StoreError> {
        self.inner.rating_distribution(tournament, bin_width)
    }

    fn match_totals(&self, tournament: TournamentId) -> Result<(u64, u64), StoreError> {
        self.inner.match_totals(tournament)
    }

    fn top_items(
        &self,
        tournament: TournamentId,
        n: usize,
    ) -> Result<Vec<ItemRating>, StoreError> {
        self.inner.top_items(tournament, n)
    }

    fn append_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.inner.append_vote(vote)?;
        self.persist()
    }

    fn reset(&self, tournament: TournamentId, initial_rating: f64) -> Result<(), StoreError> {
        self.inner.reset(tournament, initial_rating)?;
        self.persist()
    }
}

impl TournamentDirectory for JsonStore {
    fn create(&self, config: &TournamentConfig) -> Result<(), StoreError> {
        self.inner.create(config)?;
        self.persist()
    }

    fn set_state(
        &self,
        tournament: TournamentId,
        state: TournamentState,
    ) -> Result<(), StoreError> {
        self.inner.set_state(tournament, state)?;
        self.persist()
    }

    fn active(&self) -> Result<Vec<TournamentConfig>, StoreError> {
        self.inner.active()
    }
}
