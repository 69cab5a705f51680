//! Colour terminal renderer

use super::format::{
    display_amount_inr, format_rupees, group_thousands, optional_percent, percent, progress_bar,
};
use super::{BatchProgress, Reporter, RunPlan};
use crate::metrics::RunSummary;
use crate::types::outcome::{DisplayPolicy, Outcome, OutcomeKind};
use std::io::{self, Write};
use tracing::warn;

const RESET: &str = "\x1b[0m";
const WHITE: &str = "\x1b[97m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const CYAN: &str = "\x1b[96m";
const GRAY: &str = "\x1b[90m";

const BAR_WIDTH: usize = 40;
const RULE_WIDTH: usize = 70;

fn style(kind: OutcomeKind) -> (&'static str, &'static str) {
    match kind {
        OutcomeKind::TruePositive => (GREEN, "✅"),
        OutcomeKind::FalseNegative => (RED, "❌"),
        OutcomeKind::FalsePositive => (YELLOW, "⚠️"),
        OutcomeKind::TrueNegative => (WHITE, "○"),
    }
}

/// Renders the run as coloured text lines
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
    display_policy: DisplayPolicy,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            display_policy: DisplayPolicy::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn write_lines(&mut self, lines: &[String]) {
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(self.out, "{}", line))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to write console report");
        }
    }

    fn outcome_line(&self, outcome: &Outcome) -> String {
        let (color, icon) = style(outcome.kind);
        let amount = format_rupees(display_amount_inr(outcome.amount));
        let text = format!(
            "{} TX-{:04} | Amount: {:>12} | Risk: {:5.1}% | {}",
            icon,
            outcome.index,
            amount,
            outcome.probability * 100.0,
            outcome.message
        );
        self.paint(color, &text)
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_start(&mut self, plan: &RunPlan) {
        self.display_policy = plan.display_policy;
        let rule = "=".repeat(RULE_WIDTH);
        let thin = "-".repeat(RULE_WIDTH);
        let mode = match plan.display_policy {
            DisplayPolicy::ShowAll => "ALL TRANSACTIONS",
            DisplayPolicy::InterestingOnly => "INTERESTING ONLY",
        };

        let mut lines = vec![
            self.paint(CYAN, &rule),
            self.paint(CYAN, "🎯 LIVE FRAUD DETECTION"),
            self.paint(CYAN, &format!("Scorer: {}", plan.scorer)),
            self.paint(CYAN, &format!("Mode: {}", mode)),
            self.paint(CYAN, &rule),
            self.paint(
                CYAN,
                &format!("Processing {} transactions", group_thousands(plan.total_rows as u64)),
            ),
            self.paint(CYAN, &format!("Threshold: {}", plan.threshold)),
            self.paint(
                CYAN,
                &format!("Batch size: {} transactions", plan.batch_size),
            ),
            self.paint(CYAN, &thin),
            self.paint(CYAN, "🎨 COLOR LEGEND:"),
        ];
        if plan.display_policy == DisplayPolicy::ShowAll {
            lines.push(self.paint(WHITE, "  ○ Legitimate transaction"));
        }
        lines.push(self.paint(GREEN, "  ✅ Correct fraud detection"));
        lines.push(self.paint(RED, "  ❌ Missed fraud"));
        lines.push(self.paint(YELLOW, "  ⚠️  False alarm"));
        lines.push(self.paint(CYAN, &thin));

        self.write_lines(&lines);
    }

    fn on_batch(&mut self, progress: &BatchProgress, outcomes: &[Outcome]) {
        let metrics = &progress.metrics;
        let status = format!(
            "[{}] {}/{} | Speed: {} tx/sec | 🎯: {} | ❌: {} | ⚠️: {}",
            progress_bar(progress.fraction_complete(), BAR_WIDTH),
            group_thousands(metrics.processed),
            group_thousands(progress.total_rows as u64),
            group_thousands(metrics.throughput.round() as u64),
            metrics.counts.true_positive,
            metrics.counts.false_negative,
            metrics.counts.false_positive,
        );

        let mut lines = vec![self.paint(CYAN, &status)];
        lines.extend(outcomes.iter().map(|o| self.outcome_line(o)));
        self.write_lines(&lines);
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        let rule = "=".repeat(RULE_WIDTH);
        let counts = &summary.counts;
        let legit_color = match self.display_policy {
            DisplayPolicy::ShowAll => WHITE,
            DisplayPolicy::InterestingOnly => GRAY,
        };

        let mut lines = vec![
            String::new(),
            self.paint(CYAN, &rule),
            self.paint(CYAN, "📊 RUN SUMMARY"),
            self.paint(CYAN, &rule),
            self.paint(CYAN, "Transaction Outcomes:"),
            self.paint(
                legit_color,
                &format!("○ Legitimate: {}", group_thousands(counts.true_negative)),
            ),
            self.paint(
                GREEN,
                &format!("✅ Correct detections: {}", group_thousands(counts.true_positive)),
            ),
            self.paint(
                RED,
                &format!("❌ Missed frauds: {}", group_thousands(counts.false_negative)),
            ),
            self.paint(
                YELLOW,
                &format!("⚠️  False alarms: {}", group_thousands(counts.false_positive)),
            ),
            self.paint(CYAN, &"-".repeat(RULE_WIDTH)),
            self.paint(
                CYAN,
                &format!("Total transactions: {}", group_thousands(summary.total_processed)),
            ),
            self.paint(
                CYAN,
                &format!("Transactions displayed: {}", group_thousands(summary.displayed)),
            ),
            self.paint(CYAN, &format!("Alert rate: {}", percent(summary.alert_rate))),
            self.paint(
                CYAN,
                &format!(
                    "Fraud detection rate: {}",
                    optional_percent(summary.detection_rate)
                ),
            ),
            self.paint(
                CYAN,
                &format!("Processing speed: {:.1} transactions/second", summary.throughput),
            ),
            self.paint(CYAN, &format!("Total time: {:.3} seconds", summary.elapsed_secs)),
            self.paint(CYAN, &format!("Threshold: {}", summary.threshold)),
            self.paint(
                GRAY,
                &format!("Note: {} batches processed", summary.batches),
            ),
        ];
        if summary.cancelled {
            lines.push(self.paint(YELLOW, "Run cancelled before all batches completed"));
        }

        self.write_lines(&lines);
    }
}
