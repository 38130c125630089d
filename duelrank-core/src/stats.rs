//! Population statistics as a stateless reducer.
//!
//! A fold over `(n, sum, sum_of_squares)` — usable in-process over a
//! materialized list, or as the reference semantics for a store that can
//! run the aggregate itself. Standard deviation is the population form
//! (divide by n), matching the threshold calculation's contract.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    n: u64,
    sum: f64,
    sum_sq: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.n += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> Option<f64> {
        if self.n == 0 {
            None
        } else {
            Some(self.sum / self.n as f64)
        }
    }

    /// Population standard deviation, `None` on an empty set.
    pub fn population_std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        // Float error can push the variance slightly negative; clamp.
        let variance = (self.sum_sq / self.n as f64 - mean * mean).max(0.0);
        Some(variance.sqrt())
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for v in iter {
            stats.push(v);
        }
        stats
    }
}
