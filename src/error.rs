//! Error types for the batch-scoring core

use thiserror::Error;

/// Errors that abort a scoring run.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Run parameters rejected before any row was scored.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The scorer returned a different number of probabilities than rows it was given.
    #[error("Scorer returned {actual} probabilities for batch {batch} of {expected} rows")]
    ScorerContract {
        batch: usize,
        expected: usize,
        actual: usize,
    },

    /// The scorer itself failed on a batch.
    #[error("Scorer failed on batch {batch}: {source}")]
    Scorer {
        batch: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;
