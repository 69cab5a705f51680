//! Batch inference through ONNX Runtime

use crate::models::loader::{ModelLoader, ModelSession};
use crate::models::registry::ModelVersion;
use crate::models::scorer::Scorer;
use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::{debug, warn};

/// Scores a whole batch with one ONNX session call
pub struct OnnxScorer {
    model: ModelSession,
    feature_count: usize,
}

impl OnnxScorer {
    /// Load the model of a registry version
    pub fn from_version(loader: &ModelLoader, version: &ModelVersion) -> Result<Self> {
        let model = loader.load(version.model_path(), &version.name)?;
        Ok(Self {
            model,
            feature_count: version.features.len(),
        })
    }

    fn build_input(&self, batch: &[&[f32]]) -> Result<Tensor<f32>> {
        let mut flat = Vec::with_capacity(batch.len() * self.feature_count);
        for (row, features) in batch.iter().enumerate() {
            if features.len() != self.feature_count {
                bail!(
                    "Row {} of batch has {} features, model expects {}",
                    row,
                    features.len(),
                    self.feature_count
                );
            }
            flat.extend_from_slice(features);
        }

        // Shape [rows, features]
        let shape = vec![batch.len() as i64, self.feature_count as i64];
        Tensor::from_array((shape, flat)).context("Failed to create input tensor")
    }
}

impl Scorer for OnnxScorer {
    fn score_batch(&mut self, batch: &[&[f32]]) -> Result<Vec<f64>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let input_tensor = self.build_input(batch)?;

        let model = &mut self.model;
        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])?;

        let probabilities = extract_probabilities(&outputs, &model.output_name, &model.name)?;

        debug!(
            model = %model.name,
            rows = batch.len(),
            scored = probabilities.len(),
            "Batch inference complete"
        );

        Ok(probabilities)
    }

    fn name(&self) -> &str {
        &self.model.name
    }
}

/// Pull per-row fraud probabilities out of the session outputs.
/// Tensor outputs come from XGBoost/RandomForest exports, seq(map) from LightGBM/CatBoost.
fn extract_probabilities(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<Vec<f64>> {
    if let Some(output) = outputs.get(output_name) {
        let dtype = output.dtype();

        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            let (shape, data) = tensor;
            let dims: Vec<i64> = shape.iter().copied().collect();
            return probabilities_from_tensor(&dims, data);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            return extract_from_sequence_map(output);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok(tensor) = output.try_extract_tensor::<f32>() {
            let (shape, data) = tensor;
            let dims: Vec<i64> = shape.iter().copied().collect();
            debug!(model = %model_name, output = %name, "Extracting from fallback tensor output");
            return probabilities_from_tensor(&dims, data);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(probs) = extract_from_sequence_map(&output) {
                return Ok(probs);
            }
        }
    }

    warn!(model = %model_name, "No probability output found");
    Err(anyhow!("Model {} produced no probability output", model_name))
}

/// One map per row, class id -> probability
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<Vec<f64>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    let mut probabilities = Vec::with_capacity(maps.len());
    for map_value in &maps {
        let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;
        probabilities.push(fraud_probability_from_pairs(&kv_pairs)?);
    }
    Ok(probabilities)
}

/// Fraud (class 1) probability per row from a probability tensor
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Result<Vec<f64>> {
    match dims {
        // [rows, classes]
        [rows, classes] => {
            let rows = usize::try_from(*rows)
                .with_context(|| format!("Invalid row dimension in shape {:?}", dims))?;
            let classes = usize::try_from(*classes)
                .ok()
                .filter(|&c| c >= 1)
                .with_context(|| format!("Invalid class dimension in shape {:?}", dims))?;
            let needed = rows
                .checked_mul(classes)
                .with_context(|| format!("Tensor shape {:?} overflows", dims))?;
            if data.len() < needed {
                bail!("Tensor of shape {:?} holds only {} values", dims, data.len());
            }
            let column = if classes >= 2 { 1 } else { 0 };
            Ok((0..rows)
                .map(|row| data[row * classes + column] as f64)
                .collect())
        }
        // [rows], one probability each
        [_] => Ok(data.iter().map(|&p| p as f64).collect()),
        _ => bail!("Unsupported probability tensor shape {:?}", dims),
    }
}

fn fraud_probability_from_pairs(kv_pairs: &[(i64, f32)]) -> Result<f64> {
    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 1) {
        return Ok(*prob as f64);
    }
    // Only the legitimate class present
    if let Some((_, prob)) = kv_pairs.iter().find(|(class_id, _)| *class_id == 0) {
        return Ok(1.0 - *prob as f64);
    }
    Err(anyhow!("No class probability found in map"))
}
