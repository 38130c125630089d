//! Elo rating model — pure functions, no state, no side effects.
//!
//! A recorded outcome moves the winner up and the loser down by the same
//! delta: `k × (1 − expected_winner)`, where `k` is the mean of the two
//! sides' phase K-factors. Persistence is the caller's job.

use crate::domain::{ItemRating, TournamentConfig};
use crate::phase;

/// Standard logistic Elo expectation for `rating` against `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Apply one decided outcome, returning the updated pair `(winner, loser)`.
///
/// Both `matches` counters increment first and the K-factors are read
/// from the post-match counts: an item crossing a phase breakpoint on
/// this very match already moves at the smaller K. Only the winner's
/// `wins` increments. Symmetric by construction: the winner gains
/// exactly what the loser loses.
pub fn apply_outcome(
    winner: &ItemRating,
    loser: &ItemRating,
    config: &TournamentConfig,
) -> (ItemRating, ItemRating) {
    let expected_winner = expected_score(winner.rating, loser.rating);

    let mut winner = winner.clone();
    let mut loser = loser.clone();
    winner.matches += 1;
    loser.matches += 1;
    winner.wins += 1;

    let winner_k = phase::k_factor(winner.matches, config);
    let loser_k = phase::k_factor(loser.matches, config);
    let k = (winner_k + loser_k) / 2.0;

    let delta = k * (1.0 - expected_winner);
    winner.rating += delta;
    loser.rating -= delta;

    (winner, loser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, TournamentId};

    fn config() -> TournamentConfig {
        TournamentConfig::new(TournamentId(1), "t", 100)
    }

    #[test]
    fn even_match_at_full_k_moves_32_points() {
        // Both at 1500.0, both in calibration (K = 64): expected = 0.5,
        // delta = 64 * 0.5 = 32.
        let cfg = config();
        let a = ItemRating::new(ItemId(1));
        let b = ItemRating::new(ItemId(2));

        let (w, l) = apply_outcome(&a, &b, &cfg);
        assert_eq!(w.rating, 1532.0);
        assert_eq!(l.rating, 1468.0);
        assert_eq!(w.matches, 1);
        assert_eq!(l.matches, 1);
        assert_eq!(w.wins, 1);
        assert_eq!(l.wins, 0);
    }

    #[test]
    fn breakpoint_match_already_uses_the_smaller_k() {
        // Both sides at 9 matches with initial_phase_matches = 10: the
        // match being recorded is their 10th, so both read transition
        // K = 32, not the calibration K they sat at before it.
        let cfg = config();
        let mut a = ItemRating::new(ItemId(1));
        let mut b = ItemRating::new(ItemId(2));
        a.matches = 9;
        b.matches = 9;

        let (w, l) = apply_outcome(&a, &b, &cfg);
        assert_eq!(w.rating, 1516.0);
        assert_eq!(l.rating, 1484.0);
        assert_eq!(w.matches, 10);

        // Same at the stable breakpoint: the 20th match moves at K = 16.
        a.matches = 19;
        b.matches = 19;
        let (w, _) = apply_outcome(&a, &b, &cfg);
        assert_eq!(w.rating, 1508.0);
    }

    #[test]
    fn delta_is_symmetric() {
        let cfg = config();
        let mut a = ItemRating::with_rating(ItemId(1), 1712.4);
        let mut b = ItemRating::with_rating(ItemId(2), 1433.9);
        a.matches = 15; // transition phase, K = 32
        b.matches = 3; // calibration, K = 64

        let (w, l) = apply_outcome(&a, &b, &cfg);
        let gain = w.rating - a.rating;
        let loss = b.rating - l.rating;
        assert!((gain - loss).abs() < 1e-12);
    }

    #[test]
    fn upset_moves_more_than_expected_win() {
        let cfg = config();
        let strong = ItemRating::with_rating(ItemId(1), 1700.0);
        let weak = ItemRating::with_rating(ItemId(2), 1300.0);

        let (fav, _) = apply_outcome(&strong, &weak, &cfg);
        let favourite_gain = fav.rating - 1700.0;

        let (upset, _) = apply_outcome(&weak, &strong, &cfg);
        let upset_gain = upset.rating - 1300.0;

        assert!(upset_gain > favourite_gain);
    }

    #[test]
    fn expected_scores_sum_to_one() {
        let e1 = expected_score(1650.0, 1420.0);
        let e2 = expected_score(1420.0, 1650.0);
        assert!((e1 + e2 - 1.0).abs() < 1e-12);
        assert!(e1 > 0.5);
    }

    #[test]
    fn k_averages_across_phases() {
        // Winner stable (K=16), loser calibration (K=64): effective K = 40.
        let cfg = config();
        let mut a = ItemRating::new(ItemId(1));
        let b = ItemRating::new(ItemId(2));
        a.matches = 25;

        let (w, _) = apply_outcome(&a, &b, &cfg);
        assert_eq!(w.rating, 1500.0 + 40.0 * 0.5);
    }
}
