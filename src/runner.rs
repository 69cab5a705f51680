//! Batch runner: slices the input, scores each batch once, classifies every row and reports.

use crate::classifier::classify;
use crate::error::{Result, ScoringError};
use crate::metrics::{MetricsAccumulator, RunSummary};
use crate::models::scorer::Scorer;
use crate::report::{BatchProgress, Reporter, RunPlan};
use crate::types::outcome::{DisplayPolicy, Outcome};
use crate::types::transaction::TransactionRecord;
use crate::window::DisplayWindow;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Default rows per scorer call
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default flagging threshold
pub const DEFAULT_THRESHOLD: f64 = 0.063;

/// Parameters of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub batch_size: usize,
    pub threshold: f64,
    pub display_policy: DisplayPolicy,
    /// Only the first `max_transactions` rows are processed
    pub max_transactions: Option<usize>,
}

impl RunOptions {
    /// Reject a zero batch size and thresholds outside the open interval (0, 1)
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ScoringError::InvalidArgument(
                "batch_size must be positive".to_string(),
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ScoringError::InvalidArgument(format!(
                "threshold {} must lie strictly between 0 and 1",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            threshold: DEFAULT_THRESHOLD,
            display_policy: DisplayPolicy::ShowAll,
            max_transactions: None,
        }
    }
}

/// Contiguous `[start, end)` ranges of at most `batch_size` rows covering `0..len`
pub fn batch_bounds(len: usize, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
    let step = batch_size.max(1);
    (0..len)
        .step_by(step)
        .map(move |start| start..(start + step).min(len))
}

/// Drives a scoring run. Batches are processed strictly in order on the calling thread.
pub struct BatchRunner {
    options: RunOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl BatchRunner {
    /// Validates the options; nothing is processed when they are rejected
    pub fn new(options: RunOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            cancel: None,
        })
    }

    /// Stop before the next batch once `flag` is set. A batch in flight always completes.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Score `rows` and return the run summary.
    ///
    /// A scorer failure or a result count that differs from the batch size aborts the run;
    /// the offending batch is not counted.
    pub fn run<S, R>(
        &self,
        rows: &[TransactionRecord],
        scorer: &mut S,
        reporter: &mut R,
    ) -> Result<RunSummary>
    where
        S: Scorer + ?Sized,
        R: Reporter + ?Sized,
    {
        let RunOptions {
            batch_size,
            threshold,
            display_policy,
            max_transactions,
        } = self.options;

        let rows = match max_transactions {
            Some(cap) if cap < rows.len() => &rows[..cap],
            _ => rows,
        };
        let total_rows = rows.len();

        let plan = RunPlan {
            scorer: scorer.name().to_string(),
            total_rows,
            batch_size,
            batches: total_rows.div_ceil(batch_size),
            threshold,
            display_policy,
        };
        info!(
            scorer = %plan.scorer,
            rows = total_rows,
            batch_size,
            batches = plan.batches,
            threshold,
            "Starting scoring run"
        );
        reporter.on_start(&plan);

        let mut metrics = MetricsAccumulator::new();
        let mut window = DisplayWindow::new();
        let mut batches = 0u64;
        let mut displayed = 0u64;
        let mut cancelled = false;

        for (batch_index, range) in batch_bounds(total_rows, batch_size).enumerate() {
            if self.cancelled() {
                warn!(
                    batch = batch_index,
                    processed = metrics.processed(),
                    "Cancellation requested, stopping before next batch"
                );
                cancelled = true;
                break;
            }

            let batch = &rows[range.clone()];
            let features: Vec<&[f32]> = batch.iter().map(|r| r.features.as_slice()).collect();

            let probabilities = scorer.score_batch(&features).map_err(|e| {
                error!(batch = batch_index, error = %e, "Scorer failed");
                ScoringError::Scorer {
                    batch: batch_index,
                    source: e.into(),
                }
            })?;

            if probabilities.len() != batch.len() {
                error!(
                    batch = batch_index,
                    expected = batch.len(),
                    actual = probabilities.len(),
                    "Scorer result count does not match batch size"
                );
                return Err(ScoringError::ScorerContract {
                    batch: batch_index,
                    expected: batch.len(),
                    actual: probabilities.len(),
                });
            }

            for (offset, (record, &probability)) in batch.iter().zip(&probabilities).enumerate() {
                let (kind, interesting) =
                    classify(probability, threshold, record.is_actual_fraud());

                metrics.update(kind);
                metrics.record_probability(probability);

                if interesting || display_policy == DisplayPolicy::ShowAll {
                    let index = (range.start + offset + 1) as u64;
                    window.push(Outcome::new(kind, index, record.amount, probability));
                }
            }
            batches += 1;

            let snapshot = metrics.snapshot();
            debug_assert_eq!(snapshot.processed, snapshot.counts.total());
            debug_assert_eq!(snapshot.processed, range.end as u64);

            let progress = BatchProgress {
                batch_index,
                batch_start: range.start,
                batch_end: range.end,
                total_rows,
                metrics: snapshot,
            };
            // The push gate above already applied the display policy
            let shown = window.drain();
            displayed += shown.len() as u64;

            debug!(
                batch = batch_index,
                rows = batch.len(),
                processed = snapshot.processed,
                shown = shown.len(),
                "Batch processed"
            );
            reporter.on_batch(&progress, &shown);
            window.clear();
        }

        let summary = RunSummary::from_metrics(
            &metrics,
            metrics.snapshot(),
            threshold,
            batches,
            displayed,
            cancelled,
        );

        info!(
            processed = summary.total_processed,
            batches = summary.batches,
            throughput = format!("{:.1} tx/s", summary.throughput),
            cancelled = summary.cancelled,
            "Scoring run finished"
        );
        reporter.on_finish(&summary);

        Ok(summary)
    }
}
