//! Versioned model directories
//!
//! Each version lives in its own directory under the registry root:
//!
//! ```text
//! model_versions/
//!   v5_xg_20251109_154848/
//!     model.onnx
//!     features.json      {"feature_names": [...]}
//!     performance.json   {"roc_auc": 0.77}   (optional)
//!     demo_data.csv
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MODEL_FILE: &str = "model.onnx";
const FEATURES_FILE: &str = "features.json";
const PERFORMANCE_FILE: &str = "performance.json";
const DEMO_DATA_FILE: &str = "demo_data.csv";

/// Ordered feature names the model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub feature_names: Vec<String>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }
}

/// Evaluation metrics recorded when the version was trained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub roc_auc: f64,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// A model version on disk
#[derive(Debug, Clone)]
pub struct ModelVersion {
    pub name: String,
    pub dir: PathBuf,
    pub features: FeatureSchema,
    pub performance: Option<ModelPerformance>,
}

impl ModelVersion {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Demo dataset shipped alongside the model
    pub fn demo_data_path(&self) -> PathBuf {
        self.dir.join(DEMO_DATA_FILE)
    }
}

/// Directory of model versions
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All readable versions, sorted by name. Directories without a feature schema are skipped.
    pub fn list_versions(&self) -> Result<Vec<ModelVersion>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read model directory {}", self.root.display()))?;

        let mut versions = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.load_version(name) {
                Ok(version) => versions.push(version),
                Err(e) => {
                    warn!(version = %name, error = %e, "Skipping unreadable model version");
                }
            }
        }

        versions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(versions)
    }

    /// Load one version's metadata
    pub fn load_version(&self, name: &str) -> Result<ModelVersion> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            bail!("Model version {} not found in {}", name, self.root.display());
        }

        let features: FeatureSchema = read_json(&dir.join(FEATURES_FILE))?;
        if features.is_empty() {
            bail!("Model version {} declares no features", name);
        }

        let performance_path = dir.join(PERFORMANCE_FILE);
        let performance = if performance_path.exists() {
            Some(read_json(&performance_path)?)
        } else {
            None
        };

        debug!(version = %name, features = features.len(), "Model version metadata loaded");

        Ok(ModelVersion {
            name: name.to_string(),
            dir,
            features,
            performance,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
