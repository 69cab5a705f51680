//! Scorers and model loading

pub mod loader;
pub mod onnx;
pub mod registry;
pub mod scorer;
pub mod simulated;

pub use loader::ModelLoader;
pub use onnx::OnnxScorer;
pub use registry::{FeatureSchema, ModelRegistry, ModelVersion};
pub use scorer::{FnScorer, Scorer};
pub use simulated::SimulatedScorer;
