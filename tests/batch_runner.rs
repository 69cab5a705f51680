use anyhow::anyhow;
use fraud_batch_scorer::{
    BatchProgress, BatchRunner, DisplayPolicy, FnScorer, Outcome, OutcomeKind, Reporter,
    RunOptions, RunPlan, RunSummary, ScoringError, SimulatedScorer, TransactionRecord,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct RecordingReporter {
    plan: Option<RunPlan>,
    batches: Vec<(BatchProgress, Vec<Outcome>)>,
    summary: Option<RunSummary>,
}

impl Reporter for RecordingReporter {
    fn on_start(&mut self, plan: &RunPlan) {
        self.plan = Some(plan.clone());
    }

    fn on_batch(&mut self, progress: &BatchProgress, outcomes: &[Outcome]) {
        self.batches.push((*progress, outcomes.to_vec()));
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

fn options(batch_size: usize, threshold: f64, display_policy: DisplayPolicy) -> RunOptions {
    RunOptions {
        batch_size,
        threshold,
        display_policy,
        max_transactions: None,
    }
}

/// Rows whose single feature is the probability the scorer should return
fn rows_with_scores(scores: &[f32], labels: &[bool]) -> Vec<TransactionRecord> {
    scores
        .iter()
        .zip(labels)
        .map(|(&score, &label)| TransactionRecord::new(vec![score], 25.0).with_label(label))
        .collect()
}

fn echo_scorer() -> FnScorer<impl FnMut(&[&[f32]]) -> anyhow::Result<Vec<f64>>> {
    FnScorer::new("echo", |batch: &[&[f32]]| {
        Ok(batch.iter().map(|row| row[0] as f64).collect())
    })
}

#[test]
fn empty_input_yields_zero_summary() {
    let runner = BatchRunner::new(RunOptions::default()).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&[], &mut scorer, &mut reporter).unwrap();

    assert_eq!(summary.total_processed, 0);
    assert_eq!(summary.counts.total(), 0);
    assert_eq!(summary.throughput, 0.0);
    assert!(!summary.throughput.is_nan());
    assert_eq!(summary.detection_rate, None);
    assert_eq!(summary.alert_rate, 0.0);
    assert_eq!(summary.batches, 0);
    assert!(reporter.batches.is_empty());
    assert!(reporter.summary.is_some());
}

#[test]
fn mixed_outcomes_and_rates() {
    let rows = rows_with_scores(&[0.9, 0.9, 0.02], &[true, false, true]);
    let runner =
        BatchRunner::new(options(1000, 0.5, DisplayPolicy::InterestingOnly)).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

    let (_, shown) = &reporter.batches[0];
    let kinds: Vec<OutcomeKind> = shown.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutcomeKind::TruePositive,
            OutcomeKind::FalsePositive,
            OutcomeKind::FalseNegative
        ]
    );
    let ids: Vec<u64> = shown.iter().map(|o| o.index).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(summary.detection_rate, Some(0.5));
    assert!((summary.alert_rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.displayed, 3);
}

#[test]
fn batches_split_at_batch_size() {
    let rows: Vec<TransactionRecord> = (0..2500)
        .map(|_| TransactionRecord::new(vec![0.01], 10.0))
        .collect();
    let mut sizes = Vec::new();
    let mut scorer = FnScorer::new("sizes", |batch: &[&[f32]]| {
        sizes.push(batch.len());
        Ok(vec![0.01; batch.len()])
    });
    let runner = BatchRunner::new(options(1000, 0.063, DisplayPolicy::ShowAll)).unwrap();
    let mut reporter = RecordingReporter::default();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();
    drop(scorer);

    assert_eq!(sizes, vec![1000, 1000, 500]);
    assert_eq!(reporter.batches.len(), 3);
    assert_eq!(reporter.batches[1].0.metrics.processed, 2000);
    assert_eq!(reporter.batches[1].0.metrics.counts.total(), 2000);
    assert_eq!(summary.total_processed, 2500);
    assert_eq!(summary.batches, 3);
    assert_eq!(reporter.plan.unwrap().batches, 3);
}

#[test]
fn short_scorer_result_aborts_run() {
    let rows: Vec<TransactionRecord> = (0..1000)
        .map(|_| TransactionRecord::new(vec![0.9], 10.0).with_label(true))
        .collect();
    let mut scorer = FnScorer::new("short", |batch: &[&[f32]]| Ok(vec![0.9; batch.len() - 1]));
    let runner = BatchRunner::new(RunOptions::default()).unwrap();
    let mut reporter = RecordingReporter::default();

    let err = runner.run(&rows, &mut scorer, &mut reporter).unwrap_err();

    assert!(matches!(
        err,
        ScoringError::ScorerContract {
            batch: 0,
            expected: 1000,
            actual: 999
        }
    ));
    assert!(reporter.batches.is_empty());
    assert!(reporter.summary.is_none());
}

#[test]
fn contract_violation_keeps_earlier_batches_only() {
    let rows: Vec<TransactionRecord> = (0..30)
        .map(|_| TransactionRecord::new(vec![0.9], 10.0).with_label(true))
        .collect();
    let mut calls = 0;
    let mut scorer = FnScorer::new("flaky", |batch: &[&[f32]]| {
        calls += 1;
        let n = if calls == 2 { batch.len() + 1 } else { batch.len() };
        Ok(vec![0.9; n])
    });
    let runner = BatchRunner::new(options(10, 0.5, DisplayPolicy::ShowAll)).unwrap();
    let mut reporter = RecordingReporter::default();

    let err = runner.run(&rows, &mut scorer, &mut reporter).unwrap_err();

    assert!(matches!(err, ScoringError::ScorerContract { batch: 1, .. }));
    assert_eq!(reporter.batches.len(), 1);
    assert_eq!(reporter.batches[0].0.metrics.processed, 10);
}

#[test]
fn scorer_failure_is_surfaced() {
    let rows = rows_with_scores(&[0.5], &[false]);
    let mut scorer = FnScorer::new("broken", |_: &[&[f32]]| Err(anyhow!("model unavailable")));
    let runner = BatchRunner::new(RunOptions::default()).unwrap();
    let mut reporter = RecordingReporter::default();

    let err = runner.run(&rows, &mut scorer, &mut reporter).unwrap_err();
    assert!(matches!(err, ScoringError::Scorer { batch: 0, .. }));
    assert!(err.to_string().contains("model unavailable"));
}

#[test]
fn invalid_options_fail_before_scoring() {
    let result = BatchRunner::new(options(0, 0.5, DisplayPolicy::ShowAll));
    assert!(matches!(result, Err(ScoringError::InvalidArgument(_))));

    let result = BatchRunner::new(options(10, 1.2, DisplayPolicy::ShowAll));
    assert!(matches!(result, Err(ScoringError::InvalidArgument(_))));
}

#[test]
fn window_shows_latest_twenty_per_batch() {
    let rows: Vec<TransactionRecord> = (0..50)
        .map(|_| TransactionRecord::new(vec![0.01], 10.0))
        .collect();
    let runner = BatchRunner::new(options(50, 0.5, DisplayPolicy::ShowAll)).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

    let shown = &reporter.batches[0].1;
    assert_eq!(shown.len(), 20);
    assert_eq!(shown.first().unwrap().index, 31);
    assert_eq!(shown.last().unwrap().index, 50);
    assert_eq!(summary.counts.true_negative, 50);
    assert_eq!(summary.displayed, 20);
}

#[test]
fn interesting_only_drops_true_negatives() {
    let rows = rows_with_scores(&[0.01, 0.9, 0.01], &[false, false, false]);
    let runner = BatchRunner::new(options(10, 0.5, DisplayPolicy::InterestingOnly)).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

    let shown = &reporter.batches[0].1;
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].kind, OutcomeKind::FalsePositive);
    assert_eq!(summary.counts.true_negative, 2);
}

#[test]
fn displayed_indices_continue_across_batches() {
    let rows = rows_with_scores(
        &[0.9, 0.01, 0.9, 0.9, 0.01, 0.9, 0.9],
        &[true, true, false, true, false, false, true],
    );
    let runner = BatchRunner::new(options(3, 0.5, DisplayPolicy::InterestingOnly)).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();
    assert_eq!(summary.batches, 3);

    let indices: Vec<Vec<u64>> = reporter
        .batches
        .iter()
        .map(|(_, shown)| shown.iter().map(|o| o.index).collect())
        .collect();
    assert_eq!(indices, vec![vec![1, 2, 3], vec![4, 6], vec![7]]);
    // First row of batch 2 is numbered batch_size + 1
    assert_eq!(reporter.batches[1].1[0].index, 4);
    assert_eq!(reporter.batches[1].0.batch_start, 3);
}

#[test]
fn max_transactions_caps_input() {
    let rows = rows_with_scores(&[0.1; 10], &[false; 10]);
    let mut runner_options = options(4, 0.5, DisplayPolicy::ShowAll);
    runner_options.max_transactions = Some(6);
    let runner = BatchRunner::new(runner_options).unwrap();
    let mut reporter = RecordingReporter::default();
    let mut scorer = echo_scorer();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();
    assert_eq!(summary.total_processed, 6);
    assert_eq!(summary.batches, 2);
}

#[test]
fn cancellation_stops_between_batches() {
    let rows: Vec<TransactionRecord> = (0..100)
        .map(|_| TransactionRecord::new(vec![0.2], 10.0))
        .collect();
    let flag = Arc::new(AtomicBool::new(false));
    let trigger = flag.clone();
    let mut scorer = FnScorer::new("cancel-after-first", move |batch: &[&[f32]]| {
        // Raised mid-batch; the current batch must still complete
        trigger.store(true, Ordering::Relaxed);
        Ok(vec![0.2; batch.len()])
    });
    let runner = BatchRunner::new(options(25, 0.5, DisplayPolicy::ShowAll))
        .unwrap()
        .with_cancellation(flag);
    let mut reporter = RecordingReporter::default();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.total_processed, 25);
    assert_eq!(summary.counts.total(), 25);
}

#[test]
fn simulated_scorer_runs_end_to_end() {
    let rows = fraud_batch_scorer::dataset::synthetic(3000, 6, 0.05, 9);
    let mut scorer = SimulatedScorer::new(9, 0.05);
    let runner = BatchRunner::new(RunOptions::default()).unwrap();
    let mut reporter = RecordingReporter::default();

    let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

    assert_eq!(summary.total_processed, 3000);
    assert_eq!(summary.counts.total(), 3000);
    assert_eq!(summary.score_distribution.iter().sum::<u64>(), 3000);
    assert!(summary.detection_rate.is_some());
}

proptest! {
    #[test]
    fn counts_always_sum_to_rows(
        scores in proptest::collection::vec(0.0f32..1.0, 0..300),
        batch_size in 1usize..64,
        threshold in 0.01f64..0.99,
    ) {
        let labels: Vec<bool> = scores.iter().map(|s| *s > 0.7).collect();
        let rows = rows_with_scores(&scores, &labels);
        let runner = BatchRunner::new(options(batch_size, threshold, DisplayPolicy::ShowAll)).unwrap();
        let mut reporter = RecordingReporter::default();
        let mut scorer = echo_scorer();

        let summary = runner.run(&rows, &mut scorer, &mut reporter).unwrap();

        prop_assert_eq!(summary.total_processed, rows.len() as u64);
        prop_assert_eq!(summary.counts.total(), rows.len() as u64);

        let mut previous = 0;
        for (progress, shown) in &reporter.batches {
            let processed = progress.metrics.processed;
            prop_assert_eq!(processed - previous, (progress.batch_end - progress.batch_start) as u64);
            prop_assert_eq!(progress.metrics.counts.total(), processed);
            prop_assert!(shown.len() <= 20);
            previous = processed;
        }
    }
}
