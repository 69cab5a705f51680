//! ONNX Runtime session loading

use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// An ONNX session together with the tensor names used for scoring
pub struct ModelSession {
    pub name: String,
    pub session: Session,
    pub input_name: String,
    /// Output carrying class probabilities
    pub output_name: String,
}

/// Creates ONNX sessions with a fixed intra-op thread count
pub struct ModelLoader {
    onnx_threads: usize,
}

impl ModelLoader {
    /// Initialise ONNX Runtime; `onnx_threads` below 1 is raised to 1
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        let onnx_threads = onnx_threads.max(1);
        info!(onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load one model file
    pub fn load<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<ModelSession> {
        let path = path.as_ref();
        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let output_name = probability_output(&output_names);

        info!(model = %name, input = %input_name, output = %output_name, "Model loaded");

        Ok(ModelSession {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

/// Pick the probability output. Classifier exports list a label output first.
fn probability_output(names: &[&str]) -> String {
    names
        .iter()
        .find(|n| n.contains("prob"))
        .or_else(|| names.iter().find(|n| n.contains("output") && !n.contains("label")))
        .or_else(|| names.last())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "probabilities".to_string())
}
