use super::ids::TournamentId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tournament.
///
/// At most one tournament may be `Active` at a time; the directory
/// enforces this and surfaces violations as a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    Draft,
    Active,
    Finished,
}

/// Tournament configuration — immutable after creation.
///
/// The phase breakpoints (`initial_phase_matches`, `transition_phase_matches`)
/// drive both the K-factor schedule and qualification; `top_n`,
/// `std_dev_multiplier` and `band_size` shape pair selection once the whole
/// population is qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub id: TournamentId,
    pub title: String,
    /// Total number of items enrolled at creation.
    pub item_count: usize,
    #[serde(default = "defaults::initial_k")]
    pub initial_k: f64,
    #[serde(default = "defaults::minimum_k")]
    pub minimum_k: f64,
    #[serde(default = "defaults::std_dev_multiplier")]
    pub std_dev_multiplier: f64,
    #[serde(default = "defaults::initial_phase_matches")]
    pub initial_phase_matches: u32,
    #[serde(default = "defaults::transition_phase_matches")]
    pub transition_phase_matches: u32,
    #[serde(default = "defaults::top_n")]
    pub top_n: usize,
    #[serde(default = "defaults::band_size")]
    pub band_size: f64,
}

mod defaults {
    pub fn initial_k() -> f64 {
        64.0
    }
    pub fn minimum_k() -> f64 {
        16.0
    }
    pub fn std_dev_multiplier() -> f64 {
        2.0
    }
    pub fn initial_phase_matches() -> u32 {
        10
    }
    pub fn transition_phase_matches() -> u32 {
        20
    }
    pub fn top_n() -> usize {
        100
    }
    pub fn band_size() -> f64 {
        200.0
    }
}

impl TournamentConfig {
    /// Config with the standard parameter defaults.
    pub fn new(id: TournamentId, title: impl Into<String>, item_count: usize) -> Self {
        Self {
            id,
            title: title.into(),
            item_count,
            initial_k: defaults::initial_k(),
            minimum_k: defaults::minimum_k(),
            std_dev_multiplier: defaults::std_dev_multiplier(),
            initial_phase_matches: defaults::initial_phase_matches(),
            transition_phase_matches: defaults::transition_phase_matches(),
            top_n: defaults::top_n(),
            band_size: defaults::band_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_parameters() {
        let cfg = TournamentConfig::new(TournamentId(1), "t", 500);
        assert_eq!(cfg.initial_k, 64.0);
        assert_eq!(cfg.minimum_k, 16.0);
        assert_eq!(cfg.std_dev_multiplier, 2.0);
        assert_eq!(cfg.initial_phase_matches, 10);
        assert_eq!(cfg.transition_phase_matches, 20);
        assert_eq!(cfg.top_n, 100);
        assert_eq!(cfg.band_size, 200.0);
    }

    #[test]
    fn toml_omitted_fields_fall_back_to_defaults() {
        let cfg: TournamentConfig = toml::from_str(
            r#"
            id = 3
            title = "2022 questions"
            item_count = 1200
            top_n = 50
            "#,
        )
        .unwrap();
        assert_eq!(cfg.id, TournamentId(3));
        assert_eq!(cfg.top_n, 50);
        assert_eq!(cfg.initial_phase_matches, 10);
        assert_eq!(cfg.band_size, 200.0);
    }
}
