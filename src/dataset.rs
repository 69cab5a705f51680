//! Demo dataset ingestion.
//!
//! Datasets are CSV files with one column per model feature plus an amount column and an
//! optional ground-truth label column.

use crate::types::transaction::TransactionRecord;
use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Names of the non-feature columns
#[derive(Debug, Clone)]
pub struct DatasetColumns {
    pub amount: String,
    /// Ground-truth column; when the file lacks it every label is absent
    pub label: Option<String>,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            amount: "TransactionAmt".to_string(),
            label: Some("isFraud".to_string()),
        }
    }
}

/// Load up to `limit` transactions from a CSV file
pub fn load_transactions<P: AsRef<Path>>(
    path: P,
    feature_names: &[String],
    columns: &DatasetColumns,
    limit: Option<usize>,
) -> Result<Vec<TransactionRecord>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open dataset {}", path.display()))?;

    let records = read_transactions(file, feature_names, columns, limit)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = records.len(),
        features = feature_names.len(),
        "Dataset loaded"
    );
    Ok(records)
}

/// Read transactions from any CSV source
pub fn read_transactions<R: Read>(
    reader: R,
    feature_names: &[String],
    columns: &DatasetColumns,
    limit: Option<usize>,
) -> Result<Vec<TransactionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column_index = |name: &str| headers.iter().position(|h| h.trim() == name);

    let feature_indices = feature_names
        .iter()
        .map(|name| {
            column_index(name.as_str())
                .with_context(|| format!("Missing feature column {}", name))
        })
        .collect::<Result<Vec<_>>>()?;

    let amount_index = column_index(columns.amount.as_str())
        .with_context(|| format!("Missing amount column {}", columns.amount))?;

    let label_index = columns.label.as_deref().and_then(column_index);
    if label_index.is_none() {
        debug!("No label column, every transaction is treated as legitimate");
    }

    let limit = limit.unwrap_or(usize::MAX);
    let mut records = Vec::new();

    for (row, result) in csv_reader.records().enumerate() {
        if records.len() >= limit {
            break;
        }
        let line = row + 2;
        let record = result?;
        let field = |index: usize| record.get(index).unwrap_or("").trim();

        let features = feature_indices
            .iter()
            .map(|&index| parse_feature(field(index)))
            .collect::<Result<Vec<f32>>>()
            .with_context(|| format!("Bad feature value on line {}", line))?;

        let amount = parse_amount(field(amount_index))
            .with_context(|| format!("Bad amount on line {}", line))?;

        let is_fraud = match label_index {
            Some(index) => {
                parse_label(field(index)).with_context(|| format!("Bad label on line {}", line))?
            }
            None => None,
        };

        records.push(TransactionRecord {
            features,
            amount,
            is_fraud,
        });
    }

    Ok(records)
}

fn parse_feature(raw: &str) -> Result<f32> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(f32::NAN);
    }
    raw.parse::<f32>()
        .with_context(|| format!("{:?} is not a number", raw))
}

fn parse_amount(raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    let amount: f64 = raw
        .parse()
        .with_context(|| format!("{:?} is not a number", raw))?;
    if !amount.is_finite() || amount < 0.0 {
        bail!("amount {} must be a non-negative number", amount);
    }
    Ok(amount)
}

fn parse_label(raw: &str) -> Result<Option<bool>> {
    match raw {
        "" => Ok(None),
        "1" | "1.0" | "true" | "True" => Ok(Some(true)),
        "0" | "0.0" | "false" | "False" => Ok(Some(false)),
        other => bail!("{:?} is not a fraud label", other),
    }
}

/// Column names used for synthetic feature vectors
pub fn synthetic_feature_names(feature_count: usize) -> Vec<String> {
    (1..=feature_count).map(|i| format!("V{}", i)).collect()
}

/// Generate a labelled dataset. Fraudulent rows have larger amounts and shifted features.
pub fn synthetic(
    rows: usize,
    feature_count: usize,
    fraud_rate: f64,
    seed: u64,
) -> Vec<TransactionRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let fraud_rate = fraud_rate.clamp(0.0, 1.0);

    (0..rows)
        .map(|_| {
            let is_fraud = rng.gen_bool(fraud_rate);
            let (amount, shift) = if is_fraud {
                (rng.gen_range(100.0..1500.0), 1.5)
            } else {
                (rng.gen_range(1.0..300.0), 0.0)
            };
            let features = (0..feature_count)
                .map(|_| rng.gen_range(-1.0f32..1.0) + shift)
                .collect();
            TransactionRecord::new(features, amount).with_label(is_fraud)
        })
        .collect()
}
