//! Feature schemas: the ordered field layout a trained model expects.
//!
//! A schema lists every input field, how its raw string is turned into a
//! number, and the feature name the model was trained with. Raw input names
//! and feature names can differ (the claims model was trained on
//! `capital-gains` while forms submit `capital_gains`).

pub mod builtin;
pub mod codebook;
pub mod manifest;

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub use codebook::CategoryCodebook;
pub use manifest::ModelManifest;

/// How a raw field value is converted into a model feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Closed codebook lookup.
    Categorical(CategoryCodebook),
    /// Whole number, optionally bounded (inclusive).
    Integer { min: Option<i64>, max: Option<i64> },
    /// Finite real number, optionally bounded (inclusive).
    Float { min: Option<f64>, max: Option<f64> },
}

/// One field of a feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    input_name: String,
    feature_name: String,
    kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            input_name: name.to_string(),
            feature_name: name.to_string(),
            kind,
        }
    }

    pub fn categorical(name: &str, codebook: CategoryCodebook) -> Self {
        Self::new(name, FieldKind::Categorical(codebook))
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldKind::Integer { min: None, max: None })
    }

    pub fn bounded_integer(name: &str, min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(name, FieldKind::Integer { min, max })
    }

    pub fn float(name: &str, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(name, FieldKind::Float { min, max })
    }

    /// Use a different name for the model feature than for the raw input.
    pub fn with_feature_name(mut self, feature_name: &str) -> Self {
        self.feature_name = feature_name.to_string();
        self
    }

    /// Name of the field in raw input.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Name of the column the model was trained on.
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// Ordered set of fields matching a model's training layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    name: String,
    fields: Vec<FieldSpec>,
    feature_names: Arc<[String]>,
}

impl FeatureSchema {
    /// Build a schema, rejecting duplicate names and broken codebooks.
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut inputs = HashSet::new();
        let mut features = HashSet::new();

        for field in &fields {
            if !inputs.insert(field.input_name.as_str()) {
                return Err(SchemaError::DuplicateField(field.input_name.clone()));
            }
            if !features.insert(field.feature_name.as_str()) {
                return Err(SchemaError::DuplicateField(field.feature_name.clone()));
            }
            if let FieldKind::Categorical(codebook) = &field.kind {
                if codebook.is_empty() {
                    return Err(SchemaError::EmptyCodebook(field.input_name.clone()));
                }
                if codebook.has_duplicate_label() {
                    return Err(SchemaError::DuplicateCategory(field.input_name.clone()));
                }
                if codebook.has_duplicate_code() {
                    return Err(SchemaError::DuplicateCode(field.input_name.clone()));
                }
            }
        }

        let feature_names: Arc<[String]> = fields
            .iter()
            .map(|f| f.feature_name.clone())
            .collect::<Vec<_>>()
            .into();

        Ok(Self {
            name: name.to_string(),
            fields,
            feature_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Feature names in model order.
    pub fn feature_names(&self) -> &Arc<[String]> {
        &self.feature_names
    }

    /// Look up a field by its raw input name.
    pub fn field(&self, input_name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.input_name == input_name)
    }

    /// Check that feature names and order are byte-identical to `reference`.
    pub fn validate_against(&self, reference: &[String]) -> Result<(), SchemaError> {
        if reference.len() != self.fields.len() {
            return Err(SchemaError::LengthMismatch {
                expected: reference.len(),
                found: self.fields.len(),
            });
        }

        for (position, (expected, found)) in reference.iter().zip(self.feature_names.iter()).enumerate() {
            if expected != found {
                return Err(SchemaError::Mismatch {
                    position,
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Bundled schemas, one per trained model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaProfile {
    /// Twelve-field insurance claims model
    #[default]
    ClaimsV1,
    /// Nineteen-field vehicle insurance model
    VehicleClaimsV1,
}

impl SchemaProfile {
    pub fn build(self) -> Result<FeatureSchema, SchemaError> {
        match self {
            SchemaProfile::ClaimsV1 => builtin::claims_v1(),
            SchemaProfile::VehicleClaimsV1 => builtin::vehicle_claims_v1(),
        }
    }
}
