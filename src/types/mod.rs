//! Type definitions for the batch-scoring engine

pub mod outcome;
pub mod transaction;

pub use outcome::{DisplayPolicy, Outcome, OutcomeKind};
pub use transaction::{FeatureVector, TransactionRecord};
