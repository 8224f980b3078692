//! Encoded feature records

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// A single encoded feature value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    /// Codebook code of a categorical field
    Code(i64),
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FeatureValue::Code(v) | FeatureValue::Int(v) => v as f64,
            FeatureValue::Float(v) => v,
        }
    }

    pub fn as_f32(&self) -> f32 {
        self.as_f64() as f32
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            FeatureValue::Code(v) | FeatureValue::Int(v) => serializer.serialize_i64(v),
            FeatureValue::Float(v) => serializer.serialize_f64(v),
        }
    }
}

/// Encoded claim in the exact column order the model was trained on.
///
/// Only [`FeatureEncoder`](crate::feature_encoder::FeatureEncoder) builds
/// these, so every record has passed schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    names: Arc<[String]>,
    values: Vec<FeatureValue>,
}

impl FeatureRecord {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<FeatureValue>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a feature by its model-side name.
    pub fn get(&self, feature_name: &str) -> Option<FeatureValue> {
        self.names
            .iter()
            .position(|n| n == feature_name)
            .map(|i| self.values[i])
    }

    /// `(feature name, value)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureValue)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    /// Flatten into the `f32` row fed to the model.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.values.iter().map(FeatureValue::as_f32).collect()
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
