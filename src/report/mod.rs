//! Reporting collaborators that render progress and summaries.
//!
//! The batch runner emits one [`BatchProgress`] per completed batch together with the
//! outcomes selected for display, then a single [`RunSummary`]. Renderers decide formatting.

pub mod console;
pub mod format;
pub mod json;
pub mod log;

use crate::metrics::{MetricsSnapshot, RunSummary};
use crate::types::outcome::{DisplayPolicy, Outcome};
use serde::Serialize;

pub use console::ConsoleReporter;
pub use json::JsonLinesReporter;
pub use log::LogReporter;

/// What a run is about to do
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunPlan {
    pub scorer: String,
    pub total_rows: usize,
    pub batch_size: usize,
    pub batches: usize,
    pub threshold: f64,
    pub display_policy: DisplayPolicy,
}

/// Observation emitted after each batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchProgress {
    /// 0-based batch number
    pub batch_index: usize,
    pub batch_start: usize,
    pub batch_end: usize,
    pub total_rows: usize,
    pub metrics: MetricsSnapshot,
}

impl BatchProgress {
    /// Share of the input processed so far, in [0, 1]
    pub fn fraction_complete(&self) -> f64 {
        if self.total_rows == 0 {
            1.0
        } else {
            self.batch_end as f64 / self.total_rows as f64
        }
    }
}

/// Receives structured observations from the batch runner
pub trait Reporter {
    fn on_start(&mut self, _plan: &RunPlan) {}

    /// Called after each batch with the outcomes to render, oldest first
    fn on_batch(&mut self, progress: &BatchProgress, outcomes: &[Outcome]);

    fn on_finish(&mut self, summary: &RunSummary);
}
