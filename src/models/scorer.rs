//! Scoring capability used by the batch runner

use anyhow::Result;

/// Produces one fraud probability per feature row.
///
/// Called once per batch with the batch's rows in input order. The returned vector must have
/// the same length and order as `batch`; the runner treats anything else as a fatal contract
/// violation.
pub trait Scorer {
    fn score_batch(&mut self, batch: &[&[f32]]) -> Result<Vec<f64>>;

    /// Name used in logs
    fn name(&self) -> &str {
        "scorer"
    }
}

/// Adapts a closure into a [`Scorer`]
pub struct FnScorer<F> {
    name: String,
    score: F,
}

impl<F> FnScorer<F>
where
    F: FnMut(&[&[f32]]) -> Result<Vec<f64>>,
{
    pub fn new(name: &str, score: F) -> Self {
        Self {
            name: name.to_string(),
            score,
        }
    }
}

impl<F> Scorer for FnScorer<F>
where
    F: FnMut(&[&[f32]]) -> Result<Vec<f64>>,
{
    fn score_batch(&mut self, batch: &[&[f32]]) -> Result<Vec<f64>> {
        (self.score)(batch)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_scorer() {
        let mut scorer = FnScorer::new("first-feature", |batch: &[&[f32]]| {
            Ok(batch.iter().map(|row| row[0] as f64).collect())
        });

        let rows: [&[f32]; 2] = [&[0.25, 1.0], &[0.75, 1.0]];
        assert_eq!(scorer.score_batch(&rows).unwrap(), vec![0.25, 0.75]);
        assert_eq!(scorer.name(), "first-feature");
    }
}
