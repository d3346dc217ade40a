//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the defect/enhancement/task model bundle and scores bugs with it.
//!
//! A bundle is a directory with:
//! - `model.onnx`: takes a `[n_bugs, n_features]` f32 tensor, outputs
//!   `[n_bugs, n_classes]` class probabilities (no ZipMap)
//! - `metadata.json`: label encoder classes and feature width

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::features::featurize;
use super::types::ModelMetadata;
use super::BugClassifier;
use crate::error::{NagError, NagResult};
use crate::logic::bugzilla::Bug;

pub const MODEL_FILE: &str = "model.onnx";
pub const METADATA_FILE: &str = "metadata.json";

/// ONNX-backed defect/enhancement/task classifier
pub struct DefectEnhancementTaskModel {
    session: Mutex<Session>,
    metadata: ModelMetadata,
    output_name: String,
}

impl DefectEnhancementTaskModel {
    /// Load a model bundle from `dir`
    pub fn load(dir: impl AsRef<Path>) -> NagResult<Self> {
        let dir = dir.as_ref();
        let model_path = dir.join(MODEL_FILE);
        let metadata = load_metadata(dir)?;

        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(NagError::Model(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| NagError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| NagError::Model(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| NagError::Model(format!("Failed to load model: {}", e)))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let output_name = probability_output(&output_names, metadata.probability_output.as_deref())?;

        tracing::info!(
            "ONNX model loaded: {} classes, {} features, output '{}'",
            metadata.classes.len(),
            metadata.n_features,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            metadata,
            output_name,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl BugClassifier for DefectEnhancementTaskModel {
    fn classify(&self, bugs: &[Bug]) -> NagResult<Array2<f32>> {
        let n_classes = self.metadata.classes.len();
        if bugs.is_empty() {
            return Ok(Array2::zeros((0, n_classes)));
        }

        let start_time = std::time::Instant::now();
        let input = featurize(bugs, self.metadata.n_features);

        let input_tensor = Value::from_array(input)
            .map_err(|e| NagError::Model(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| NagError::Model(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| NagError::Model("No output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| NagError::Model(format!("Extract error: {}", e)))?;

        let data = output_tensor.1.to_vec();
        let probs = Array2::from_shape_vec((bugs.len(), n_classes), data)
            .map_err(|e| NagError::Model(format!("Unexpected output shape: {}", e)))?;

        tracing::debug!(
            "Classified {} bugs in {} ms",
            bugs.len(),
            start_time.elapsed().as_millis()
        );

        Ok(probs)
    }

    fn decode_label(&self, index: usize) -> NagResult<String> {
        self.metadata
            .decode(index)
            .map(str::to_string)
            .ok_or_else(|| {
                NagError::Model(format!(
                    "Class index {} out of range ({} classes)",
                    index,
                    self.metadata.classes.len()
                ))
            })
    }
}

/// Names probability outputs are commonly exported under
pub const PROBABILITY_OUTPUTS: [&str; 2] = ["probabilities", "output_probability"];

/// Pick the output holding class probabilities.
///
/// An explicit `requested` name must exist. Otherwise a well-known
/// probability name wins, then the last output: classifier exports put the
/// int64 `label` tensor first.
pub fn probability_output(outputs: &[String], requested: Option<&str>) -> NagResult<String> {
    if let Some(name) = requested {
        return outputs
            .iter()
            .find(|o| o.as_str() == name)
            .cloned()
            .ok_or_else(|| NagError::Model(format!("Model has no output named {}", name)));
    }

    PROBABILITY_OUTPUTS
        .iter()
        .find_map(|known| outputs.iter().find(|o| o.as_str() == *known))
        .or_else(|| outputs.last())
        .cloned()
        .ok_or_else(|| NagError::Model("No output defined".to_string()))
}

/// Read and check `metadata.json`
pub fn load_metadata(dir: &Path) -> NagResult<ModelMetadata> {
    let path = dir.join(METADATA_FILE);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| NagError::Model(format!("Cannot read {}: {}", path.display(), e)))?;
    let metadata: ModelMetadata = serde_json::from_str(&raw)?;

    if metadata.classes.is_empty() {
        return Err(NagError::Model("Model metadata lists no classes".to_string()));
    }
    if metadata.n_features == 0 {
        return Err(NagError::Model("Model metadata has n_features = 0".to_string()));
    }
    Ok(metadata)
}
