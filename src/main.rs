//! Fraud Batch Scorer - Main Entry Point
//!
//! Loads a dataset and a scorer, runs the batch loop and renders progress.
//! Ctrl-C stops the run after the batch in flight.

use anyhow::{Context, Result};
use fraud_batch_scorer::{
    config::{AppConfig, ReportFormat, ScorerSource, DEFAULT_CONFIG_PATH},
    dataset,
    models::{ModelLoader, ModelRegistry, OnnxScorer, Scorer, SimulatedScorer},
    report::{ConsoleReporter, JsonLinesReporter, LogReporter, Reporter},
    BatchRunner, TransactionRecord,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Feature width of the synthetic dataset used in simulated mode
const SYNTHETIC_FEATURES: usize = 22;

/// Fraud share of the synthetic dataset
const SYNTHETIC_FRAUD_RATE: f64 = 0.035;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("fraud_batch_scorer={}", config.logging.level).parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Build the scorer and the rows it will score
fn prepare(config: &AppConfig) -> Result<(Box<dyn Scorer + Send>, Vec<TransactionRecord>)> {
    match config.model.source {
        ScorerSource::Simulated => {
            let rows = match config.data_path() {
                Some(path) => {
                    let header = dataset::synthetic_feature_names(SYNTHETIC_FEATURES);
                    dataset::load_transactions(
                        path,
                        &header,
                        &config.dataset_columns(),
                        config.scoring.max_transactions,
                    )?
                }
                None => dataset::synthetic(
                    config.data.synthetic_rows,
                    SYNTHETIC_FEATURES,
                    SYNTHETIC_FRAUD_RATE,
                    config.model.simulation_seed,
                ),
            };
            let scorer: Box<dyn Scorer + Send> = Box::new(SimulatedScorer::new(
                config.model.simulation_seed,
                config.model.suspicious_rate,
            ));
            Ok((scorer, rows))
        }
        ScorerSource::Onnx => {
            let registry = ModelRegistry::new(&config.model.versions_dir);
            match registry.list_versions() {
                Ok(versions) => {
                    for version in &versions {
                        info!(
                            version = %version.name,
                            features = version.features.len(),
                            roc_auc = version.performance.as_ref().map(|p| p.roc_auc),
                            "Available model version"
                        );
                    }
                }
                Err(e) => warn!(error = %e, "Could not list model versions"),
            }

            let version = registry
                .load_version(&config.model.version)
                .with_context(|| format!("Failed to load model version {}", config.model.version))?;
            if let Some(performance) = &version.performance {
                info!(version = %version.name, roc_auc = performance.roc_auc, "Model version selected");
            }

            let loader = ModelLoader::with_threads(config.model.onnx_threads)?;
            let scorer: Box<dyn Scorer + Send> =
                Box::new(OnnxScorer::from_version(&loader, &version)?);

            let data_path = config
                .data_path()
                .unwrap_or_else(|| version.demo_data_path());
            let rows = dataset::load_transactions(
                data_path,
                &version.features.feature_names,
                &config.dataset_columns(),
                config.scoring.max_transactions,
            )?;

            Ok((scorer, rows))
        }
    }
}

fn build_reporter(config: &AppConfig) -> Box<dyn Reporter + Send> {
    match config.reporting.format {
        ReportFormat::Console => Box::new(ConsoleReporter::stdout(config.reporting.color)),
        ReportFormat::Log => Box::new(LogReporter::new()),
        ReportFormat::Json => Box::new(JsonLinesReporter::new(std::io::stdout())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    init_logging(&config)?;
    info!(path = %config_path, "Configuration loaded successfully");

    // Reject bad parameters before touching models or data
    let options = config.run_options()?;
    info!(
        threshold = options.threshold,
        batch_size = options.batch_size,
        display_policy = ?options.display_policy,
        max_transactions = ?options.max_transactions,
        "Run options validated"
    );

    let (mut scorer, rows) = prepare(&config)?;
    let mut reporter = build_reporter(&config);

    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current batch");
            signal_flag.store(true, Ordering::Relaxed);
        }
    });

    let runner = BatchRunner::new(options)?.with_cancellation(cancel);

    let summary = tokio::task::spawn_blocking(move || {
        runner.run(&rows, scorer.as_mut(), reporter.as_mut())
    })
    .await
    .context("Batch worker panicked")??;

    if summary.cancelled {
        warn!(
            processed = summary.total_processed,
            "Run stopped early"
        );
    }

    Ok(())
}
