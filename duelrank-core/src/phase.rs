//! Phase policy — K-factor schedule and qualification.
//!
//! Both are step functions of an item's match count against the
//! tournament-configured breakpoints. New items move fast (`initial_k`),
//! settled items move slowly (`minimum_k`), with a half-K transition band
//! in between. The same counter gates qualification: an item becomes
//! qualified once it has played `initial_phase_matches` matches.

use crate::domain::TournamentConfig;
use serde::{Deserialize, Serialize};

/// Which K-factor regime an item is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Below `initial_phase_matches`: full `initial_k`, still unqualified.
    Calibration,
    /// Qualified but still settling: `initial_k / 2`.
    Transition,
    /// At or past `transition_phase_matches`: `minimum_k`.
    Stable,
}

/// Phase for an item with the given match count.
pub fn phase_for(matches: u32, config: &TournamentConfig) -> Phase {
    if matches < config.initial_phase_matches {
        Phase::Calibration
    } else if matches < config.transition_phase_matches {
        Phase::Transition
    } else {
        Phase::Stable
    }
}

/// K-factor for an item with the given match count.
///
/// Monotonically non-increasing in `matches` for any sane configuration
/// (`minimum_k <= initial_k / 2 <= initial_k`).
pub fn k_factor(matches: u32, config: &TournamentConfig) -> f64 {
    match phase_for(matches, config) {
        Phase::Calibration => config.initial_k,
        Phase::Transition => config.initial_k / 2.0,
        Phase::Stable => config.minimum_k,
    }
}

/// Whether an item has accumulated the mandatory minimum exposure.
pub fn is_qualified(matches: u32, config: &TournamentConfig) -> bool {
    matches >= config.initial_phase_matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TournamentId;

    fn config() -> TournamentConfig {
        let mut cfg = TournamentConfig::new(TournamentId(1), "t", 100);
        cfg.initial_k = 64.0;
        cfg.minimum_k = 16.0;
        cfg.initial_phase_matches = 10;
        cfg.transition_phase_matches = 20;
        cfg
    }

    #[test]
    fn k_factor_follows_breakpoints() {
        let cfg = config();
        assert_eq!(k_factor(0, &cfg), 64.0);
        assert_eq!(k_factor(9, &cfg), 64.0);
        assert_eq!(k_factor(10, &cfg), 32.0);
        assert_eq!(k_factor(19, &cfg), 32.0);
        assert_eq!(k_factor(20, &cfg), 16.0);
        assert_eq!(k_factor(1000, &cfg), 16.0);
    }

    #[test]
    fn k_factor_is_monotonically_non_increasing() {
        let cfg = config();
        let mut prev = f64::INFINITY;
        for matches in 0..50 {
            let k = k_factor(matches, &cfg);
            assert!(k <= prev, "K rose at {matches} matches");
            prev = k;
        }
    }

    #[test]
    fn qualification_flips_exactly_at_the_breakpoint() {
        let cfg = config();
        assert!(!is_qualified(9, &cfg));
        assert!(is_qualified(10, &cfg));
        assert_eq!(phase_for(9, &cfg), Phase::Calibration);
        assert_eq!(phase_for(10, &cfg), Phase::Transition);
        assert_eq!(phase_for(20, &cfg), Phase::Stable);
    }
}
