//! Dynamic qualification threshold.
//!
//! Once enough items are qualified, items statistically unlikely to make
//! the final top-N stop being presented, concentrating comparisons on the
//! contenders. The cutoff is soft: an item need only be within
//! `std_dev_multiplier` standard deviations of the N-th best rating to
//! stay viable.

use crate::domain::TournamentConfig;
use crate::error::EngineError;
use crate::store::ItemStore;

/// Minimum rating for a qualified item to remain a live contender.
///
/// `NEG_INFINITY` while fewer than `top_n` items are qualified — every
/// item is still viable and no filtering happens. Recomputed on every
/// call; the population changes after each recorded match, so this is
/// never cached.
pub fn calculate_threshold<S: ItemStore>(
    store: &S,
    config: &TournamentConfig,
) -> Result<f64, EngineError> {
    let stats = store.qualified_stats(config.id, config.initial_phase_matches)?;
    if stats.count < config.top_n {
        return Ok(f64::NEG_INFINITY);
    }

    // 1-indexed rank among qualified ratings, descending. The guard above
    // makes the clamp a no-op; it stays as a floor against a shrinking
    // population between the two store reads.
    let rank = config.top_n.min(stats.count);
    let top_n_rating = store.rating_at_rank(config.id, config.initial_phase_matches, rank)?;

    Ok(top_n_rating - config.std_dev_multiplier * stats.std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, ItemRating, TournamentConfig, TournamentId, INITIAL_RATING};
    use crate::store::{ItemStore, MemoryStore};

    const T: TournamentId = TournamentId(1);

    fn store_with(records: Vec<ItemRating>) -> MemoryStore {
        let store = MemoryStore::with_seed(7);
        let ids: Vec<ItemId> = records.iter().map(|r| r.item).collect();
        store.create_items(T, &ids, INITIAL_RATING).unwrap();
        for r in &records {
            store.put_pair(T, r, r).unwrap();
        }
        store
    }

    fn rated(id: i64, rating: f64, matches: u32) -> ItemRating {
        let mut r = ItemRating::with_rating(ItemId(id), rating);
        r.matches = matches;
        r.wins = matches / 2;
        r
    }

    #[test]
    fn sparse_population_returns_negative_infinity() {
        let mut cfg = TournamentConfig::new(T, "t", 10);
        cfg.top_n = 5;
        cfg.initial_phase_matches = 10;

        // 4 qualified < top_n = 5
        let store = store_with((1..=4).map(|i| rated(i, 1500.0, 10)).collect());
        let threshold = calculate_threshold(&store, &cfg).unwrap();
        assert_eq!(threshold, f64::NEG_INFINITY);
    }

    #[test]
    fn threshold_sits_below_nth_rating() {
        // 150 qualified items spread 1000..2000, top_n = 100, multiplier 1.5:
        // the threshold must fall strictly below the 100th-ranked rating.
        let mut cfg = TournamentConfig::new(T, "t", 150);
        cfg.top_n = 100;
        cfg.std_dev_multiplier = 1.5;
        cfg.initial_phase_matches = 10;

        let records: Vec<ItemRating> = (0..150)
            .map(|i| rated(i + 1, 1000.0 + (i as f64) * 1000.0 / 149.0, 10))
            .collect();
        let nth_best = {
            let mut ratings: Vec<f64> = records.iter().map(|r| r.rating).collect();
            ratings.sort_by(|a, b| b.total_cmp(a));
            ratings[99]
        };

        let store = store_with(records);
        let threshold = calculate_threshold(&store, &cfg).unwrap();
        assert!(threshold.is_finite());
        assert!(threshold < nth_best);
    }

    #[test]
    fn unqualified_items_never_count() {
        let mut cfg = TournamentConfig::new(T, "t", 6);
        cfg.top_n = 3;
        cfg.initial_phase_matches = 10;

        // 3 qualified at the breakpoint, 3 well-played-but-short items
        let mut records: Vec<ItemRating> = (1..=3).map(|i| rated(i, 1600.0, 10)).collect();
        records.extend((4..=6).map(|i| rated(i, 2000.0, 9)));

        let store = store_with(records);
        let threshold = calculate_threshold(&store, &cfg).unwrap();
        // All qualified ratings equal: std dev 0, threshold is exactly the
        // 3rd-ranked qualified rating. The 2000-rated items are invisible.
        assert_eq!(threshold, 1600.0);
    }
}
