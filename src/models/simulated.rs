//! Seeded stand-in scorer for runs without a trained model

use crate::models::scorer::Scorer;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates plausible fraud probabilities without looking at the features.
///
/// Most rows get a low score skewed towards zero; a `suspicious_rate` share gets a score in
/// `[0.3, 0.99)`. The same seed always yields the same sequence.
pub struct SimulatedScorer {
    rng: StdRng,
    suspicious_rate: f64,
}

impl SimulatedScorer {
    pub fn new(seed: u64, suspicious_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            suspicious_rate: suspicious_rate.clamp(0.0, 1.0),
        }
    }

    fn next_probability(&mut self) -> f64 {
        if self.rng.gen_bool(self.suspicious_rate) {
            self.rng.gen_range(0.3..0.99)
        } else {
            self.rng.gen::<f64>().powi(4) * 0.2
        }
    }
}

impl Scorer for SimulatedScorer {
    fn score_batch(&mut self, batch: &[&[f32]]) -> Result<Vec<f64>> {
        Ok(batch.iter().map(|_| self.next_probability()).collect())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
