//! Pair selector — decides which two items to compare next.
//!
//! Three cases in strict priority order:
//!
//! 1. Two or more unqualified items: both draws come from the unqualified
//!    pool, driving every item through its mandatory minimum exposure.
//! 2. Exactly one unqualified item: pair it with a draw from the entire
//!    population rather than waste a round on two settled items.
//! 3. All qualified: both draws come from at or above the threshold; with
//!    a large contender pool the second draw is additionally restricted
//!    to a rating band around the first item.
//!
//! Identical draws are retried with an engine-owned counter, bounded so a
//! single-item eligible pool errors out instead of looping forever.

use crate::domain::{ItemId, TournamentConfig};
use crate::error::EngineError;
use crate::store::{ItemStore, SampleFilter};
use std::sync::atomic::{AtomicU64, Ordering};

use super::threshold::calculate_threshold;

/// Retry bound floor for tiny populations; above this the bound is the
/// population size itself. A healthy 2-item pool collides with
/// probability 1/2 per draw, so the floor has to sit where a run of
/// honest collisions is effectively impossible (here 2^-32 per call).
const RETRY_FLOOR: u64 = 32;

/// Contender-pool size above which the second qualified draw is
/// restricted to the rating band. Policy choice: with fewer contenders
/// the band buys little and risks empty draws.
const BAND_MIN_POOL: usize = 50;

/// Select two distinct items for the next round.
pub fn select_pair<S: ItemStore>(
    store: &S,
    config: &TournamentConfig,
    retries: &AtomicU64,
) -> Result<(ItemId, ItemId), EngineError> {
    let bound = (config.item_count as u64).max(RETRY_FLOOR);
    let mut attempts = 0u64;
    loop {
        let (first, second) = draw_candidates(store, config)?;
        if first != second {
            return Ok((first, second));
        }
        retries.fetch_add(1, Ordering::Relaxed);
        attempts += 1;
        if attempts >= bound {
            return Err(EngineError::DegeneratePool { attempts });
        }
    }
}

fn draw_candidates<S: ItemStore>(
    store: &S,
    config: &TournamentConfig,
) -> Result<(ItemId, ItemId), EngineError> {
    let unqualified = store.count_unqualified(config.id, config.initial_phase_matches)?;

    if unqualified > 1 {
        tracing::debug!(unqualified, "pairing two unqualified items");
        let filter = SampleFilter::unqualified(config.initial_phase_matches);
        let first = sample(store, config, &filter, "unqualified")?;
        let second = sample(store, config, &filter, "unqualified")?;
        Ok((first, second))
    } else if unqualified == 1 {
        tracing::debug!("pairing the last unqualified item against the population");
        let first = sample(
            store,
            config,
            &SampleFilter::unqualified(config.initial_phase_matches),
            "unqualified",
        )?;
        let second = sample(store, config, &SampleFilter::any(), "population")?;
        Ok((first, second))
    } else {
        let threshold = calculate_threshold(store, config)?;
        tracing::debug!(threshold, "pairing two contenders");
        draw_qualified(store, config, threshold)
    }
}

fn draw_qualified<S: ItemStore>(
    store: &S,
    config: &TournamentConfig,
    threshold: f64,
) -> Result<(ItemId, ItemId), EngineError> {
    let contender_filter = SampleFilter::at_or_above(threshold);
    let first = store
        .sample(config.id, &contender_filter)?
        .ok_or(EngineError::EmptyPool { pool: "contender" })?;

    let pool = store.count_at_or_above(config.id, threshold)?;
    if pool > BAND_MIN_POOL && config.band_size > 0.0 {
        let band = SampleFilter {
            min_rating: Some(threshold.max(first.rating - config.band_size)),
            max_rating: Some(first.rating + config.band_size),
            exclude: Some(first.item),
            ..SampleFilter::default()
        };
        // An empty band widens back to the plain contender draw rather
        // than failing the round.
        if let Some(second) = store.sample(config.id, &band)? {
            return Ok((first.item, second.item));
        }
    }

    let second = store
        .sample(config.id, &contender_filter)?
        .ok_or(EngineError::EmptyPool { pool: "contender" })?;
    Ok((first.item, second.item))
}

fn sample<S: ItemStore>(
    store: &S,
    config: &TournamentConfig,
    filter: &SampleFilter,
    pool: &'static str,
) -> Result<ItemId, EngineError> {
    store
        .sample(config.id, filter)?
        .map(|r| r.item)
        .ok_or(EngineError::EmptyPool { pool })
}
