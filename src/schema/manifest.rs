//! Model manifest: the stored reference list of trained feature names.
//!
//! Shipped next to the model file, e.g. `models/fraud_model.manifest.json`:
//!
//! ```json
//! { "model_version": "claims-rf-2024.1", "feature_names": ["insured_sex", "..."] }
//! ```

use super::builtin::{CLAIMS_V1_FEATURES, VEHICLE_CLAIMS_V1_FEATURES};
use super::SchemaProfile;
use crate::config::ModelConfig;
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Version and feature layout of a trained model artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub model_version: String,
    pub feature_names: Vec<String>,
}

impl ModelManifest {
    /// Read a manifest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let manifest_error = |reason: String| SchemaError::Manifest {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| manifest_error(e.to_string()))?;
        let manifest: ModelManifest =
            serde_json::from_str(&contents).map_err(|e| manifest_error(e.to_string()))?;

        if manifest.feature_names.is_empty() {
            return Err(manifest_error("manifest lists no features".to_string()));
        }

        info!(
            path = %path.display(),
            model_version = %manifest.model_version,
            features = manifest.feature_names.len(),
            "Model manifest loaded"
        );

        Ok(manifest)
    }

    /// Manifest for the configured model: the file at `manifest_path` when
    /// set, otherwise the bundled reference list of the configured schema.
    pub fn resolve(config: &ModelConfig) -> Result<Self, SchemaError> {
        match &config.manifest_path {
            Some(path) => Self::load(path),
            None => {
                warn!("No model manifest configured, using the bundled reference list");
                Ok(Self::reference(config.schema))
            }
        }
    }

    /// Reference layout compiled into the binary for a bundled schema.
    pub fn reference(profile: SchemaProfile) -> Self {
        let (version, names): (&str, &[&str]) = match profile {
            SchemaProfile::ClaimsV1 => ("claims_v1", &CLAIMS_V1_FEATURES[..]),
            SchemaProfile::VehicleClaimsV1 => ("vehicle_claims_v1", &VEHICLE_CLAIMS_V1_FEATURES[..]),
        };

        Self {
            model_version: version.to_string(),
            feature_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }
}
