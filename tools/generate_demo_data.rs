//! Demo Dataset Generator
//!
//! Writes a labelled synthetic dataset and its feature schema so the scorer can be exercised
//! without real transaction data.
//!
//! Usage: generate-demo-data [OUT_DIR] [COUNT] [FRAUD_RATE] [SEED]

use anyhow::{Context, Result};
use fraud_batch_scorer::dataset::{synthetic, synthetic_feature_names};
use fraud_batch_scorer::models::FeatureSchema;
use std::fs;
use std::path::PathBuf;
use tracing::info;

const FEATURE_COUNT: usize = 22;

fn arg<T: std::str::FromStr>(position: usize, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::args().nth(position) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid argument {}: {}", position, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let out_dir: PathBuf = arg(1, PathBuf::from("model_versions/synthetic"))?;
    let count: usize = arg(2, 10_000)?;
    let fraud_rate: f64 = arg(3, 0.035)?;
    let seed: u64 = arg(4, 42)?;

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let feature_names = synthetic_feature_names(FEATURE_COUNT);
    let records = synthetic(count, FEATURE_COUNT, fraud_rate, seed);

    let data_path = out_dir.join("demo_data.csv");
    let mut writer = csv::Writer::from_path(&data_path)
        .with_context(|| format!("Failed to create {}", data_path.display()))?;

    let mut header = feature_names.clone();
    header.push("TransactionAmt".to_string());
    header.push("isFraud".to_string());
    writer.write_record(&header)?;

    let mut frauds = 0usize;
    for record in &records {
        let mut row: Vec<String> = record.features.iter().map(|f| f.to_string()).collect();
        row.push(format!("{:.2}", record.amount));
        let is_fraud = record.is_actual_fraud();
        frauds += is_fraud as usize;
        row.push(if is_fraud { "1" } else { "0" }.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let schema = FeatureSchema { feature_names };
    let schema_path = out_dir.join("features.json");
    fs::write(&schema_path, serde_json::to_string_pretty(&schema)?)
        .with_context(|| format!("Failed to write {}", schema_path.display()))?;

    info!(
        rows = records.len(),
        frauds,
        legitimate = records.len() - frauds,
        path = %data_path.display(),
        "Demo dataset written"
    );

    Ok(())
}
