//! ONNX Runtime implementation of [`FraudModel`]

use crate::models::loader::{LoadedModel, ModelLoader};
use crate::models::model::FraudModel;
use crate::types::FeatureRecord;
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Classifier backed by a single `.onnx` artifact.
///
/// The runtime session needs exclusive access per run, so runs are
/// serialized behind a mutex. The session itself is never replaced.
pub struct OnnxModel {
    name: String,
    version: String,
    inner: Mutex<LoadedModel>,
}

impl OnnxModel {
    /// Load the artifact at `path`.
    pub fn load<P: AsRef<Path>>(
        path: P,
        name: &str,
        version: &str,
        onnx_threads: usize,
    ) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let loaded = loader.load_model(path, name)?;

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            inner: Mutex::new(loaded),
        })
    }

    fn run(&self, features: Vec<f32>) -> Result<f64> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let model: &mut LoadedModel = &mut guard;

        // Shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor =
            Tensor::from_array((shape, features)).context("Failed to create input tensor")?;

        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model
            .session
            .run(ort::inputs![input_name.as_str() => input_tensor])?;

        extract_probability(&outputs, &output_name, &self.name)
    }
}

impl FraudModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64> {
        self.run(record.to_f32_vec())
    }
}

/// Extract the fraud probability from model output.
///
/// Handles tensor outputs (`zipmap=False` exports, gradient boosting) and the
/// `seq(map(int64, float))` output scikit-learn classifiers export by default.
fn extract_probability(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
    model_name: &str,
) -> Result<f64> {
    if let Some(output) = outputs.get(output_name) {
        if let Some(prob) = probability_from_value(&output, model_name)? {
            return Ok(prob);
        }
    }

    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(prob) = probability_from_value(&output, model_name)? {
            debug!(model = %model_name, output = %name, "Probability read from fallback output");
            return Ok(prob);
        }
    }

    anyhow::bail!("model produced no probability output")
}

fn probability_from_value(output: &ort::value::DynValue, model_name: &str) -> Result<Option<f64>> {
    if let Ok(tensor) = output.try_extract_tensor::<f32>() {
        let (shape, data) = tensor;
        let dims: Vec<i64> = shape.iter().copied().collect();
        let prob = fraud_prob_from_tensor(&dims, data)?;
        debug!(model = %model_name, prob = prob, "Extracted from tensor");
        return Ok(Some(prob));
    }

    if DynSequenceValueType::can_downcast(&output.dtype()) {
        let prob = fraud_prob_from_sequence_map(output)?;
        debug!(model = %model_name, prob = prob, "Extracted from seq(map)");
        return Ok(Some(prob));
    }

    Ok(None)
}

/// Read class 1 from a `seq(map(int64, float))` output with batch size 1.
fn fraud_prob_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let first = maps.first().context("Empty probability sequence")?;
    let kv_pairs = first.try_extract_key_values::<i64, f32>()?;

    fraud_prob_from_class_map(&kv_pairs)
}

/// P(class 1) from `(class_id, probability)` pairs, falling back to `1 - P(class 0)`.
fn fraud_prob_from_class_map(pairs: &[(i64, f32)]) -> Result<f64> {
    if let Some((_, prob)) = pairs.iter().find(|(class_id, _)| *class_id == 1) {
        return Ok(*prob as f64);
    }
    if let Some((_, prob)) = pairs.iter().find(|(class_id, _)| *class_id == 0) {
        return Ok(1.0 - *prob as f64);
    }

    anyhow::bail!("No class probability found in map")
}

/// Read class 1 from a probability tensor of shape `[1, 2]`, `[1, 1]`, `[2]` or `[1]`.
fn fraud_prob_from_tensor(dims: &[i64], data: &[f32]) -> Result<f64> {
    let num_classes = match dims {
        [1, n] | [n] => *n,
        _ => anyhow::bail!("unexpected probability tensor shape {:?}", dims),
    };

    let index = match num_classes {
        2 => 1,
        1 => 0,
        n => anyhow::bail!("expected a binary classifier, got {} classes", n),
    };

    data.get(index)
        .map(|p| *p as f64)
        .with_context(|| format!("probability tensor {:?} holds {} values", dims, data.len()))
}
