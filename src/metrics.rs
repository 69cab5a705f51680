//! Running counters and derived rates for a scoring run.

use crate::types::outcome::OutcomeKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Number of equal-width probability buckets in the score distribution
pub const SCORE_BUCKETS: usize = 10;

/// Per-kind outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub true_positive: u64,
    pub false_negative: u64,
    pub false_positive: u64,
    pub true_negative: u64,
}

impl OutcomeCounts {
    /// Count for a single kind
    pub fn get(&self, kind: OutcomeKind) -> u64 {
        match kind {
            OutcomeKind::TruePositive => self.true_positive,
            OutcomeKind::FalseNegative => self.false_negative,
            OutcomeKind::FalsePositive => self.false_positive,
            OutcomeKind::TrueNegative => self.true_negative,
        }
    }

    fn increment(&mut self, kind: OutcomeKind) {
        let slot = match kind {
            OutcomeKind::TruePositive => &mut self.true_positive,
            OutcomeKind::FalseNegative => &mut self.false_negative,
            OutcomeKind::FalsePositive => &mut self.false_positive,
            OutcomeKind::TrueNegative => &mut self.true_negative,
        };
        *slot += 1;
    }

    /// Sum of all four counters
    pub fn total(&self) -> u64 {
        self.true_positive + self.false_negative + self.false_positive + self.true_negative
    }

    /// Transactions labelled as fraud
    pub fn actual_frauds(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    /// Transactions the scorer flagged
    pub fn alerts(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    /// Share of actual frauds that were flagged; `None` when the sample has no frauds
    pub fn detection_rate(&self) -> Option<f64> {
        let frauds = self.actual_frauds();
        if frauds == 0 {
            None
        } else {
            Some(self.true_positive as f64 / frauds as f64)
        }
    }

    /// Share of all transactions that were flagged (0 for an empty run)
    pub fn alert_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.alerts() as f64 / total as f64
        }
    }
}

/// Point-in-time view of the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub processed: u64,
    pub counts: OutcomeCounts,
    pub elapsed: Duration,
    /// Transactions per second since the run began
    pub throughput: f64,
}

/// Running counters owned by the batch runner. Strictly additive.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    processed: u64,
    counts: OutcomeCounts,
    score_buckets: [u64; SCORE_BUCKETS],
    start_time: Instant,
    started_at: DateTime<Utc>,
}

impl MetricsAccumulator {
    /// Start a new accumulator; the clock starts now
    pub fn new() -> Self {
        Self {
            processed: 0,
            counts: OutcomeCounts::default(),
            score_buckets: [0; SCORE_BUCKETS],
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Record one classified transaction
    pub fn update(&mut self, kind: OutcomeKind) {
        self.processed += 1;
        self.counts.increment(kind);
    }

    /// Record a probability in the score distribution. Out-of-range values are clamped
    /// into the end buckets; NaN is ignored.
    pub fn record_probability(&mut self, probability: f64) {
        if probability.is_nan() {
            return;
        }
        let bucket = (probability * SCORE_BUCKETS as f64)
            .clamp(0.0, (SCORE_BUCKETS - 1) as f64) as usize;
        self.score_buckets[bucket] += 1;
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn score_distribution(&self) -> [u64; SCORE_BUCKETS] {
        self.score_buckets
    }

    /// Wall-clock time the run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Snapshot using the current monotonic time
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// Snapshot as observed at `now`
    pub fn snapshot_at(&self, now: Instant) -> MetricsSnapshot {
        let elapsed = now.saturating_duration_since(self.start_time);
        MetricsSnapshot {
            processed: self.processed,
            counts: self.counts,
            elapsed,
            throughput: throughput(self.processed, elapsed),
        }
    }
}

impl Default for MetricsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Transactions per second, 0 when nothing was processed or no time has passed
pub fn throughput(processed: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if processed == 0 || secs <= 0.0 {
        0.0
    } else {
        processed as f64 / secs
    }
}

/// Final result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_processed: u64,
    pub counts: OutcomeCounts,
    pub elapsed_secs: f64,
    /// Transactions per second over the whole run
    pub throughput: f64,
    /// True positives over actual frauds; `None` means not applicable (no frauds)
    pub detection_rate: Option<f64>,
    /// Flagged transactions over all processed
    pub alert_rate: f64,
    pub batches: u64,
    /// Outcomes handed to the reporter for rendering
    pub displayed: u64,
    pub score_distribution: [u64; SCORE_BUCKETS],
    pub threshold: f64,
    pub started_at: DateTime<Utc>,
    /// Set when the run stopped early on a cancellation request
    pub cancelled: bool,
}

impl RunSummary {
    /// Build a summary from the accumulator as it stands at `snapshot`
    pub fn from_metrics(
        metrics: &MetricsAccumulator,
        snapshot: MetricsSnapshot,
        threshold: f64,
        batches: u64,
        displayed: u64,
        cancelled: bool,
    ) -> Self {
        Self {
            total_processed: snapshot.processed,
            counts: snapshot.counts,
            elapsed_secs: snapshot.elapsed.as_secs_f64(),
            throughput: snapshot.throughput,
            detection_rate: snapshot.counts.detection_rate(),
            alert_rate: snapshot.counts.alert_rate(),
            batches,
            displayed,
            score_distribution: metrics.score_distribution(),
            threshold,
            started_at: metrics.started_at(),
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let mut metrics = MetricsAccumulator::new();

        metrics.update(OutcomeKind::TruePositive);
        metrics.update(OutcomeKind::TrueNegative);
        metrics.update(OutcomeKind::TrueNegative);

        assert_eq!(metrics.processed(), 3);
        assert_eq!(metrics.counts().true_negative, 2);
        assert_eq!(metrics.counts().total(), metrics.processed());
    }

    #[test]
    fn test_rates() {
        let counts = OutcomeCounts {
            true_positive: 1,
            false_negative: 1,
            false_positive: 1,
            true_negative: 0,
        };

        assert_eq!(counts.detection_rate(), Some(0.5));
        assert!((counts.alert_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_detection_rate_without_frauds() {
        let counts = OutcomeCounts {
            false_positive: 4,
            true_negative: 10,
            ..Default::default()
        };
        assert_eq!(counts.detection_rate(), None);
        assert_eq!(OutcomeCounts::default().alert_rate(), 0.0);
    }

    #[test]
    fn test_throughput_uses_elapsed_since_start() {
        let mut metrics = MetricsAccumulator::new();
        for _ in 0..500 {
            metrics.update(OutcomeKind::TrueNegative);
        }

        let now = metrics.start_time + Duration::from_secs(2);
        let snapshot = metrics.snapshot_at(now);
        assert_eq!(snapshot.elapsed, Duration::from_secs(2));
        assert!((snapshot.throughput - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_zero_cases() {
        assert_eq!(throughput(0, Duration::from_secs(1)), 0.0);
        assert_eq!(throughput(10, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_score_distribution() {
        let mut metrics = MetricsAccumulator::new();
        metrics.record_probability(0.05);
        metrics.record_probability(0.95);
        metrics.record_probability(1.0);
        metrics.record_probability(-0.2);
        metrics.record_probability(f64::NAN);

        let dist = metrics.score_distribution();
        assert_eq!(dist[0], 2);
        assert_eq!(dist[9], 2);
        assert_eq!(dist.iter().sum::<u64>(), 4);
    }
}
