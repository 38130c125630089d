//! Synthetic tournament driver.
//!
//! Replaces the human judge with a noisy oracle: every item gets a hidden
//! quality drawn from the master seed, and each round's winner is drawn
//! with the logistic win probability implied by the two qualities. With a
//! fixed seed the whole run replays bit-identically, which makes this the
//! standard way to sanity-check a configuration before pointing real
//! voters at it.

use anyhow::Result;
use rand::Rng;
use std::collections::HashMap;

use duelrank_core::domain::{Ballot, ItemId, UserId};
use duelrank_core::rating::expected_score;
use duelrank_core::rng::SeedTree;
use duelrank_core::store::ItemStore;
use duelrank_core::TournamentEngine;

/// Synthetic voter id recorded on simulated ballots.
const ORACLE_VOTER: UserId = UserId(0);

pub fn run<S: ItemStore>(
    engine: &TournamentEngine<S>,
    rounds: u64,
    no_preference_rate: f64,
    report_every: u64,
    seed: u64,
) -> Result<()> {
    let config = engine.config();
    let tree = SeedTree::new(seed);
    let mut judge = tree.rng_for(config.id, "judge");

    // Hidden qualities, lazily assigned per item so the id space can be
    // sparse. Spread matches the rating scale the thresholds operate on.
    let mut qualities: HashMap<ItemId, f64> = HashMap::new();
    let mut quality_rng = tree.rng_for(config.id, "quality");
    let mut quality_of = move |item: ItemId, rng: &mut rand::rngs::StdRng| {
        *qualities.entry(item).or_insert_with(|| rng.gen_range(1000.0..2000.0))
    };

    for round in 1..=rounds {
        let (first, second) = engine.select_pair()?;

        let selected = if judge.gen_bool(no_preference_rate.clamp(0.0, 1.0)) {
            None
        } else {
            let p_first = expected_score(
                quality_of(first, &mut quality_rng),
                quality_of(second, &mut quality_rng),
            );
            Some(if judge.gen_bool(p_first) { first } else { second })
        };

        engine.record_outcome(&Ballot {
            voter: ORACLE_VOTER,
            first,
            second,
            selected,
        })?;

        if report_every > 0 && round % report_every == 0 {
            let stats = engine.statistics()?;
            println!(
                "round {round}: unqualified={} above_threshold={} retries={}",
                stats.unqualified, stats.above_threshold, stats.retries
            );
        }
    }

    let stats = engine.statistics()?;
    println!(
        "done: {rounds} rounds, {} matches recorded, threshold {}",
        stats.total_matches,
        if stats.threshold.is_finite() {
            format!("{:.1}", stats.threshold)
        } else {
            "none yet".to_string()
        }
    );
    Ok(())
}
