//! JSON Lines renderer, one event object per line.
//!
//! Event shapes follow the dashboard feed: `connected`, then one `batch` per batch carrying
//! the displayed transactions and running stats, then a final `summary`.

use super::format::display_amount_inr;
use super::{BatchProgress, Reporter, RunPlan};
use crate::metrics::{MetricsSnapshot, RunSummary};
use crate::types::outcome::{Outcome, OutcomeKind};
use serde::Serialize;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Event<'a> {
    Connected {
        message: String,
        plan: &'a RunPlan,
    },
    Batch {
        batch_size: usize,
        transactions: Vec<TransactionView<'a>>,
        stats: Stats,
    },
    Summary {
        summary: &'a RunSummary,
    },
}

#[derive(Debug, Serialize)]
struct TransactionView<'a> {
    id: u64,
    kind: OutcomeKind,
    amount: f64,
    display_amount: f64,
    /// Percent
    risk: f64,
    message: &'a str,
}

/// Running stats; rates are percentages, `detection_rate` is null when not applicable
#[derive(Debug, Serialize)]
struct Stats {
    total_processed: u64,
    fraud_detected: u64,
    missed_fraud: u64,
    false_alarms: u64,
    detection_rate: Option<f64>,
    processing_speed: f64,
    alert_rate: f64,
    threshold: f64,
}

impl Stats {
    fn from_snapshot(metrics: &MetricsSnapshot, threshold: f64) -> Self {
        Self {
            total_processed: metrics.processed,
            fraud_detected: metrics.counts.true_positive,
            missed_fraud: metrics.counts.false_negative,
            false_alarms: metrics.counts.false_positive,
            detection_rate: metrics.counts.detection_rate().map(|r| r * 100.0),
            processing_speed: metrics.throughput,
            alert_rate: metrics.counts.alert_rate() * 100.0,
            threshold,
        }
    }
}

/// Writes each observation as a JSON object on its own line
pub struct JsonLinesReporter<W: Write> {
    out: W,
    threshold: f64,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            threshold: 0.0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) {
        let result = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write JSON report event");
        }
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn on_start(&mut self, plan: &RunPlan) {
        self.threshold = plan.threshold;
        self.emit(&Event::Connected {
            message: format!("Scoring {} transactions with {}", plan.total_rows, plan.scorer),
            plan,
        });
    }

    fn on_batch(&mut self, progress: &BatchProgress, outcomes: &[Outcome]) {
        let transactions = outcomes
            .iter()
            .map(|o| TransactionView {
                id: o.index,
                kind: o.kind,
                amount: o.amount,
                display_amount: display_amount_inr(o.amount),
                risk: o.probability * 100.0,
                message: &o.message,
            })
            .collect();

        let event = Event::Batch {
            batch_size: progress.batch_end - progress.batch_start,
            transactions,
            stats: Stats::from_snapshot(&progress.metrics, self.threshold),
        };
        self.emit(&event);
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        self.emit(&Event::Summary { summary });
    }
}
