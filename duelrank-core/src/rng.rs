//! Deterministic seed derivation.
//!
//! A master seed expands into sub-seeds for each `(tournament, label)`
//! pair via BLAKE3 hashing. Derivation is order-independent, so a store
//! and a simulation driver seeded from the same master seed replay
//! bit-identically no matter which component asks first.

use crate::domain::TournamentId;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct SeedTree {
    master_seed: u64,
}

impl SeedTree {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a sub-seed for a specific `(tournament, label)`.
    pub fn sub_seed(&self, tournament: TournamentId, label: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(&tournament.0.to_le_bytes());
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        u64::from_le_bytes(hash.as_bytes()[..8].try_into().expect("blake3 output is 32 bytes"))
    }

    /// Seeded `StdRng` for a `(tournament, label)`.
    pub fn rng_for(&self, tournament: TournamentId, label: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(tournament, label))
    }
}
