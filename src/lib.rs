//! Fraud Batch Scorer Library
//!
//! Streams transaction records through a fraud scorer in fixed-size batches, classifies each
//! row against its ground-truth label, keeps a bounded window of recent outcomes for display
//! and reports running throughput and accuracy.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod report;
pub mod runner;
pub mod types;
pub mod window;

pub use classifier::classify;
pub use config::AppConfig;
pub use error::{Result, ScoringError};
pub use metrics::{MetricsAccumulator, MetricsSnapshot, OutcomeCounts, RunSummary};
pub use models::{FnScorer, OnnxScorer, Scorer, SimulatedScorer};
pub use report::{BatchProgress, Reporter, RunPlan};
pub use runner::{BatchRunner, RunOptions};
pub use types::{DisplayPolicy, Outcome, OutcomeKind, TransactionRecord};
pub use window::DisplayWindow;
