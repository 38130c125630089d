//! In-memory store — the reference `ItemStore` implementation.
//!
//! Everything lives behind a single mutex, which also gives `put_pair` its
//! atomicity: concurrent `record_outcome` calls on disjoint pairs
//! interleave safely, and two calls touching the same item serialize.
//! Sampling is count-then-offset against the filtered view, driven by a
//! seedable RNG so whole runs can replay deterministically.

use super::{ItemStore, QualifiedStats, SampleFilter, StoreError, TournamentDirectory};
use crate::domain::{
    ItemId, ItemRating, TournamentConfig, TournamentId, TournamentState, Vote,
};
use crate::stats::RunningStats;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Serializable snapshot of the whole store (also the JSON store's
/// on-disk format). Vec-based so it survives JSON, which cannot key
/// objects by numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub tournaments: Vec<(TournamentConfig, TournamentState)>,
    pub items: Vec<(TournamentId, Vec<ItemRating>)>,
    pub votes: Vec<Vote>,
}

#[derive(Default)]
struct Tables {
    tournaments: BTreeMap<TournamentId, (TournamentConfig, TournamentState)>,
    items: BTreeMap<TournamentId, BTreeMap<ItemId, ItemRating>>,
    votes: Vec<Vote>,
}

impl Tables {
    fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tournaments: self.tournaments.values().cloned().collect(),
            items: self
                .items
                .iter()
                .map(|(id, records)| (*id, records.values().cloned().collect()))
                .collect(),
            votes: self.votes.clone(),
        }
    }

    fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tournaments: snapshot
                .tournaments
                .into_iter()
                .map(|(config, state)| (config.id, (config, state)))
                .collect(),
            items: snapshot
                .items
                .into_iter()
                .map(|(id, records)| {
                    (id, records.into_iter().map(|r| (r.item, r)).collect())
                })
                .collect(),
            votes: snapshot.votes,
        }
    }
}

struct Inner {
    tables: Tables,
    rng: StdRng,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tables: Tables::default(),
                rng: StdRng::from_entropy(),
            }),
        }
    }

    /// Store whose sampling replays deterministically.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tables: Tables::default(),
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot, seed: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                tables: Tables::from_snapshot(snapshot),
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().tables.to_snapshot()
    }

    /// Number of logged votes (the engine itself never reads them back).
    pub fn vote_count(&self) -> usize {
        self.lock().tables.votes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned mutex means a panic mid-write; propagating the panic
        // beats serving torn state.
        self.inner.lock().expect("store mutex poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn qualified_ratings(items: &BTreeMap<ItemId, ItemRating>, cutoff: u32) -> Vec<f64> {
    items
        .values()
        .filter(|r| r.matches >= cutoff)
        .map(|r| r.rating)
        .collect()
}

impl ItemStore for MemoryStore {
    fn sample(
        &self,
        tournament: TournamentId,
        filter: &SampleFilter,
    ) -> Result<Option<ItemRating>, StoreError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(items) = inner.tables.items.get(&tournament) else {
            return Ok(None);
        };

        let count = items.values().filter(|r| filter.admits(r)).count();
        if count == 0 {
            return Ok(None);
        }

        let offset = inner.rng.gen_range(0..count);
        Ok(items
            .values()
            .filter(|r| filter.admits(r))
            .nth(offset)
            .cloned())
    }

    fn get(&self, tournament: TournamentId, item: ItemId) -> Result<ItemRating, StoreError> {
        self.lock()
            .tables
            .items
            .get(&tournament)
            .and_then(|items| items.get(&item))
            .cloned()
            .ok_or(StoreError::ItemNotFound { tournament, item })
    }

    fn create_items(
        &self,
        tournament: TournamentId,
        items: &[ItemId],
        initial_rating: f64,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let records = inner.tables.items.entry(tournament).or_default();
        if !records.is_empty() {
            return Err(StoreError::TournamentExists(tournament));
        }
        for &item in items {
            records.insert(item, ItemRating::with_rating(item, initial_rating));
        }
        Ok(())
    }

    fn put_pair(
        &self,
        tournament: TournamentId,
        a: &ItemRating,
        b: &ItemRating,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let items = inner
            .tables
            .items
            .get_mut(&tournament)
            .ok_or(StoreError::TournamentNotFound(tournament))?;

        // Validate both before touching either, so the write is all-or-nothing.
        for record in [a, b] {
            if !items.contains_key(&record.item) {
                return Err(StoreError::ItemNotFound {
                    tournament,
                    item: record.item,
                });
            }
        }
        items.insert(a.item, a.clone());
        items.insert(b.item, b.clone());
        Ok(())
    }

    fn update_pair(
        &self,
        tournament: TournamentId,
        a: ItemId,
        b: ItemId,
        apply: &dyn Fn(&ItemRating, &ItemRating) -> (ItemRating, ItemRating),
    ) -> Result<(ItemRating, ItemRating), StoreError> {
        // Load, apply, and write back under the one store lock; a
        // concurrent call on an overlapping pair sees this write.
        let mut inner = self.lock();
        let items = inner
            .tables
            .items
            .get_mut(&tournament)
            .ok_or(StoreError::TournamentNotFound(tournament))?;

        let record_a = items
            .get(&a)
            .cloned()
            .ok_or(StoreError::ItemNotFound { tournament, item: a })?;
        let record_b = items
            .get(&b)
            .cloned()
            .ok_or(StoreError::ItemNotFound { tournament, item: b })?;

        let (updated_a, updated_b) = apply(&record_a, &record_b);
        items.insert(updated_a.item, updated_a.clone());
        items.insert(updated_b.item, updated_b.clone());
        Ok((updated_a, updated_b))
    }

    fn qualified_stats(
        &self,
        tournament: TournamentId,
        cutoff: u32,
    ) -> Result<QualifiedStats, StoreError> {
        let inner = self.lock();
        let ratings = inner
            .tables
            .items
            .get(&tournament)
            .map(|items| qualified_ratings(items, cutoff))
            .unwrap_or_default();
        let stats: RunningStats = ratings.iter().copied().collect();
        Ok(QualifiedStats {
            count: ratings.len(),
            std_dev: stats.population_std_dev().unwrap_or(0.0),
        })
    }

    fn rating_at_rank(
        &self,
        tournament: TournamentId,
        cutoff: u32,
        rank: usize,
    ) -> Result<f64, StoreError> {
        let inner = self.lock();
        let mut ratings = inner
            .tables
            .items
            .get(&tournament)
            .map(|items| qualified_ratings(items, cutoff))
            .unwrap_or_default();
        if rank == 0 || rank > ratings.len() {
            return Err(StoreError::RankOutOfRange {
                rank,
                available: ratings.len(),
            });
        }
        ratings.sort_by(|x, y| y.total_cmp(x));
        Ok(ratings[rank - 1])
    }

    fn count_unqualified(
        &self,
        tournament: TournamentId,
        cutoff: u32,
    ) -> Result<usize, StoreError> {
        let inner = self.lock();
        Ok(inner
            .tables
            .items
            .get(&tournament)
            .map(|items| items.values().filter(|r| r.matches < cutoff).count())
            .unwrap_or(0))
    }

    fn count_at_or_above(
        &self,
        tournament: TournamentId,
        threshold: f64,
    ) -> Result<usize, StoreError> {
        let inner = self.lock();
        Ok(inner
            .tables
            .items
            .get(&tournament)
            .map(|items| items.values().filter(|r| r.rating >= threshold).count())
            .unwrap_or(0))
    }

    fn rating_distribution(
        &self,
        tournament: TournamentId,
        bin_width: f64,
    ) -> Result<BTreeMap<i64, usize>, StoreError> {
        let inner = self.lock();
        let mut histogram = BTreeMap::new();
        if let Some(items) = inner.tables.items.get(&tournament) {
            for record in items.values() {
                let bin = ((record.rating / bin_width).floor() * bin_width) as i64;
                *histogram.entry(bin).or_insert(0) += 1;
            }
        }
        Ok(histogram)
    }

    fn match_totals(&self, tournament: TournamentId) -> Result<(u64, u64), StoreError> {
        let inner = self.lock();
        let (mut matches, mut wins) = (0u64, 0u64);
        if let Some(items) = inner.tables.items.get(&tournament) {
            for record in items.values() {
                matches += u64::from(record.matches);
                wins += u64::from(record.wins);
            }
        }
        Ok((matches, wins))
    }

    fn top_items(
        &self,
        tournament: TournamentId,
        n: usize,
    ) -> Result<Vec<ItemRating>, StoreError> {
        let inner = self.lock();
        let mut records: Vec<ItemRating> = inner
            .tables
            .items
            .get(&tournament)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|x, y| y.rating.total_cmp(&x.rating));
        records.truncate(n);
        Ok(records)
    }

    fn append_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        self.lock().tables.votes.push(vote.clone());
        Ok(())
    }

    fn reset(&self, tournament: TournamentId, initial_rating: f64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let items = inner
            .tables
            .items
            .get_mut(&tournament)
            .ok_or(StoreError::TournamentNotFound(tournament))?;
        for record in items.values_mut() {
            record.rating = initial_rating;
            record.matches = 0;
            record.wins = 0;
        }
        Ok(())
    }
}

impl TournamentDirectory for MemoryStore {
    fn create(&self, config: &TournamentConfig) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.tables.tournaments.contains_key(&config.id) {
            return Err(StoreError::TournamentExists(config.id));
        }
        inner
            .tables
            .tournaments
            .insert(config.id, (config.clone(), TournamentState::Draft));
        Ok(())
    }

    fn set_state(
        &self,
        tournament: TournamentId,
        state: TournamentState,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let entry = inner
            .tables
            .tournaments
            .get_mut(&tournament)
            .ok_or(StoreError::TournamentNotFound(tournament))?;
        entry.1 = state;
        Ok(())
    }

    fn active(&self) -> Result<Vec<TournamentConfig>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .tables
            .tournaments
            .values()
            .filter(|(_, state)| *state == TournamentState::Active)
            .map(|(config, _)| config.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, INITIAL_RATING};

    const T: TournamentId = TournamentId(1);

    fn seeded_store(item_count: i64) -> MemoryStore {
        let store = MemoryStore::with_seed(42);
        let ids: Vec<ItemId> = (1..=item_count).map(ItemId).collect();
        store.create_items(T, &ids, INITIAL_RATING).unwrap();
        store
    }

    fn bump(store: &MemoryStore, item: ItemId, rating: f64, matches: u32, wins: u32) {
        let mut record = store.get(T, item).unwrap();
        record.rating = rating;
        record.matches = matches;
        record.wins = wins;
        // put_pair with the same row on both sides is fine for test setup
        store.put_pair(T, &record, &record).unwrap();
    }

    #[test]
    fn sample_respects_max_matches() {
        let store = seeded_store(5);
        bump(&store, ItemId(1), 1500.0, 12, 6);
        bump(&store, ItemId(2), 1500.0, 12, 6);

        let filter = SampleFilter::unqualified(10);
        for _ in 0..50 {
            let picked = store.sample(T, &filter).unwrap().unwrap();
            assert!(picked.matches < 10);
        }
    }

    #[test]
    fn sample_respects_rating_band_and_exclusion() {
        let store = seeded_store(4);
        bump(&store, ItemId(1), 1400.0, 0, 0);
        bump(&store, ItemId(2), 1555.0, 0, 0);
        bump(&store, ItemId(3), 1600.0, 0, 0);
        bump(&store, ItemId(4), 1900.0, 0, 0);

        let filter = SampleFilter {
            min_rating: Some(1500.0),
            max_rating: Some(1700.0),
            exclude: Some(ItemId(2)),
            ..SampleFilter::default()
        };
        for _ in 0..50 {
            let picked = store.sample(T, &filter).unwrap().unwrap();
            assert_eq!(picked.item, ItemId(3));
        }
    }

    #[test]
    fn sample_empty_pool_returns_none() {
        let store = seeded_store(3);
        let filter = SampleFilter::at_or_above(9000.0);
        assert!(store.sample(T, &filter).unwrap().is_none());
        assert!(store
            .sample(TournamentId(99), &SampleFilter::any())
            .unwrap()
            .is_none());
    }

    #[test]
    fn rating_at_rank_is_one_indexed_descending() {
        let store = seeded_store(3);
        bump(&store, ItemId(1), 1600.0, 10, 5);
        bump(&store, ItemId(2), 1500.0, 10, 5);
        bump(&store, ItemId(3), 1400.0, 10, 5);

        assert_eq!(store.rating_at_rank(T, 10, 1).unwrap(), 1600.0);
        assert_eq!(store.rating_at_rank(T, 10, 3).unwrap(), 1400.0);
        assert!(matches!(
            store.rating_at_rank(T, 10, 4),
            Err(StoreError::RankOutOfRange { .. })
        ));
    }

    #[test]
    fn qualified_stats_ignore_unqualified_items() {
        let store = seeded_store(4);
        bump(&store, ItemId(1), 1600.0, 10, 5);
        bump(&store, ItemId(2), 1400.0, 15, 5);
        // items 3 and 4 stay at 0 matches

        let stats = store.qualified_stats(T, 10).unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.std_dev - 100.0).abs() < 1e-9);
    }

    #[test]
    fn put_pair_rejects_unknown_item_without_partial_write() {
        let store = seeded_store(2);
        let known = store.get(T, ItemId(1)).unwrap();
        let mut updated = known.clone();
        updated.rating = 1700.0;
        let ghost = ItemRating::new(ItemId(99));

        assert!(store.put_pair(T, &updated, &ghost).is_err());
        // First row untouched even though it was listed first.
        assert_eq!(store.get(T, ItemId(1)).unwrap().rating, known.rating);
    }

    #[test]
    fn reset_restores_initial_state() {
        let store = seeded_store(3);
        bump(&store, ItemId(2), 1712.0, 30, 21);

        store.reset(T, INITIAL_RATING).unwrap();
        for id in 1..=3 {
            let record = store.get(T, ItemId(id)).unwrap();
            assert_eq!(record.rating, INITIAL_RATING);
            assert_eq!(record.matches, 0);
            assert_eq!(record.wins, 0);
        }
    }

    #[test]
    fn votes_append_only() {
        let store = seeded_store(2);
        let vote = Vote {
            voter: UserId(7),
            first: ItemId(1),
            second: ItemId(2),
            tournament: T,
            selected: None,
            cast_at: chrono::Utc::now(),
        };
        store.append_vote(&vote).unwrap();
        store.append_vote(&vote).unwrap();
        assert_eq!(store.vote_count(), 2);
    }

    #[test]
    fn directory_tracks_active_state() {
        let store = MemoryStore::with_seed(1);
        let a = TournamentConfig::new(TournamentId(1), "a", 10);
        let b = TournamentConfig::new(TournamentId(2), "b", 10);
        store.create(&a).unwrap();
        store.create(&b).unwrap();
        assert!(store.active().unwrap().is_empty());

        store.set_state(TournamentId(1), TournamentState::Active).unwrap();
        let active = store.active().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, TournamentId(1));

        store.set_state(TournamentId(2), TournamentState::Active).unwrap();
        assert_eq!(store.active().unwrap().len(), 2);

        store
            .set_state(TournamentId(1), TournamentState::Finished)
            .unwrap();
        assert_eq!(store.active().unwrap()[0].id, TournamentId(2));
    }

    #[test]
    fn snapshot_round_trips() {
        let store = seeded_store(3);
        bump(&store, ItemId(1), 1650.0, 12, 9);
        let snapshot = store.snapshot();

        let restored = MemoryStore::from_snapshot(snapshot, 42);
        assert_eq!(restored.get(T, ItemId(1)).unwrap().rating, 1650.0);
        assert_eq!(restored.get(T, ItemId(3)).unwrap().rating, INITIAL_RATING);
    }
}
