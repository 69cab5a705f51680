//! Configuration management for the batch scorer

use crate::dataset::DatasetColumns;
use crate::error::Result as ScoringResult;
use crate::runner::{RunOptions, DEFAULT_BATCH_SIZE, DEFAULT_THRESHOLD};
use crate::types::outcome::DisplayPolicy;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Where probabilities come from
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerSource {
    /// ONNX model from the version registry
    #[default]
    Onnx,
    /// Seeded random scores on a synthetic dataset
    Simulated,
}

/// Renderer for progress and summary
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Colour terminal output
    #[default]
    Console,
    /// Structured log lines
    Log,
    /// One JSON event per line on stdout
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Batch loop parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Probability above which a transaction is flagged
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Rows per scorer call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// "show_all" or "interesting_only"
    #[serde(default)]
    pub display_policy: DisplayPolicy,
    /// Cap on the number of transactions processed
    #[serde(default)]
    pub max_transactions: Option<usize>,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Model selection
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub source: ScorerSource,
    /// Directory holding one subdirectory per model version
    #[serde(default = "default_versions_dir")]
    pub versions_dir: String,
    /// Version to load
    #[serde(default = "default_version")]
    pub version: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Seed for the simulated scorer and synthetic data
    #[serde(default = "default_simulation_seed")]
    pub simulation_seed: u64,
    /// Share of rows the simulated scorer scores high
    #[serde(default = "default_suspicious_rate")]
    pub suspicious_rate: f64,
}

fn default_versions_dir() -> String {
    "model_versions".to_string()
}

fn default_version() -> String {
    "v5_xg_20251109_154848".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_simulation_seed() -> u64 {
    42
}

fn default_suspicious_rate() -> f64 {
    0.035
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            source: ScorerSource::default(),
            versions_dir: default_versions_dir(),
            version: default_version(),
            onnx_threads: default_onnx_threads(),
            simulation_seed: default_simulation_seed(),
            suspicious_rate: default_suspicious_rate(),
        }
    }
}

/// Input dataset
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// CSV file; defaults to the model version's demo_data.csv
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_amount_column")]
    pub amount_column: String,
    /// Empty string disables labels
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Rows generated in simulated mode
    #[serde(default = "default_synthetic_rows")]
    pub synthetic_rows: usize,
}

fn default_amount_column() -> String {
    "TransactionAmt".to_string()
}

fn default_label_column() -> String {
    "isFraud".to_string()
}

fn default_synthetic_rows() -> usize {
    10_000
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            amount_column: default_amount_column(),
            label_column: default_label_column(),
            synthetic_rows: default_synthetic_rows(),
        }
    }
}

/// Output renderer
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default)]
    pub format: ReportFormat,
    /// ANSI colours in console output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Console,
            color: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// `FRAUD_SCORER__SECTION__KEY` environment variables override file values,
    /// e.g. `FRAUD_SCORER__SCORING__THRESHOLD=0.1`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FRAUD_SCORER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validated batch loop parameters
    pub fn run_options(&self) -> ScoringResult<RunOptions> {
        let options = RunOptions {
            batch_size: self.scoring.batch_size,
            threshold: self.scoring.threshold,
            display_policy: self.scoring.display_policy,
            max_transactions: self.scoring.max_transactions,
        };
        options.validate()?;
        Ok(options)
    }

    /// Dataset column names
    pub fn dataset_columns(&self) -> DatasetColumns {
        let label = self.data.label_column.trim();
        DatasetColumns {
            amount: self.data.amount_column.clone(),
            label: (!label.is_empty()).then(|| label.to_string()),
        }
    }

    /// Explicit dataset path, if configured
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data.path.as_ref().map(PathBuf::from)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig {
                threshold: DEFAULT_THRESHOLD,
                batch_size: DEFAULT_BATCH_SIZE,
                display_policy: DisplayPolicy::ShowAll,
                max_transactions: Some(10_000),
            },
            model: ModelConfig::default(),
            data: DataConfig::default(),
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
