//! Structured log renderer

use super::format::{group_thousands, optional_percent, percent};
use super::{BatchProgress, Reporter, RunPlan};
use crate::metrics::{RunSummary, SCORE_BUCKETS};
use crate::types::outcome::Outcome;
use tracing::{debug, info, warn};

/// Emits progress and the final summary through `tracing`
#[derive(Debug, Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for LogReporter {
    fn on_start(&mut self, plan: &RunPlan) {
        info!(
            scorer = %plan.scorer,
            rows = plan.total_rows,
            batch_size = plan.batch_size,
            batches = plan.batches,
            threshold = plan.threshold,
            display_policy = ?plan.display_policy,
            "Starting batch processing"
        );
    }

    fn on_batch(&mut self, progress: &BatchProgress, outcomes: &[Outcome]) {
        let metrics = &progress.metrics;
        info!(
            batch = progress.batch_index + 1,
            processed = metrics.processed,
            total = progress.total_rows,
            throughput = format!("{:.1} tx/s", metrics.throughput),
            elapsed_ms = metrics.elapsed.as_millis() as u64,
            true_positive = metrics.counts.true_positive,
            false_negative = metrics.counts.false_negative,
            false_positive = metrics.counts.false_positive,
            true_negative = metrics.counts.true_negative,
            "Batch complete"
        );

        for outcome in outcomes {
            debug!(
                index = outcome.index,
                kind = %outcome.kind,
                amount = outcome.amount,
                probability = outcome.probability,
                "{}",
                outcome.message
            );
        }
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        let counts = &summary.counts;

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD BATCH SCORING - RUN SUMMARY               ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Processed: {:>10}  │  Throughput: {:>8.1} tx/s",
            group_thousands(summary.total_processed),
            summary.throughput
        );
        info!(
            "║ Alert Rate: {:>7}  │  Detection Rate: {:>7}  │  Batches: {}",
            percent(summary.alert_rate),
            optional_percent(summary.detection_rate),
            summary.batches
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Correct detections: {:>8}", counts.true_positive);
        info!("║ Missed frauds:      {:>8}", counts.false_negative);
        info!("║ False alarms:       {:>8}", counts.false_positive);
        info!("║ Legitimate:         {:>8}", counts.true_negative);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:");
        let total: u64 = summary.score_distribution.iter().sum();
        for (i, &count) in summary.score_distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>8} ({:>5.1}%) {}",
                i as f64 / SCORE_BUCKETS as f64,
                (i + 1) as f64 / SCORE_BUCKETS as f64,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
        info!(
            elapsed_secs = summary.elapsed_secs,
            threshold = summary.threshold,
            started_at = %summary.started_at,
            "Run finished"
        );

        if summary.cancelled {
            warn!(
                processed = summary.total_processed,
                "Run was cancelled before all batches completed"
            );
        }
    }
}
