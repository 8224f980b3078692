//! Configuration management for the claim fraud pipeline

use crate::schema::SchemaProfile;
use crate::types::Threshold;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming claim requests
    pub claim_subject: String,
    /// Subject for outgoing verdicts
    pub verdict_subject: String,
    /// Queue group shared by gateway replicas
    #[serde(default)]
    pub queue_group: Option<String>,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the `.onnx` file
    pub path: String,
    /// Path to the JSON manifest listing trained feature names.
    /// The bundled reference list for `schema` is used when unset.
    #[serde(default)]
    pub manifest_path: Option<String>,
    /// Model name reported in verdicts
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Bundled schema the model was trained on
    #[serde(default)]
    pub schema: SchemaProfile,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_name() -> String {
    "fraud_model".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "models/fraud_model.onnx".to_string(),
            manifest_path: Some("models/fraud_model.manifest.json".to_string()),
            name: default_model_name(),
            schema: SchemaProfile::ClaimsV1,
            onnx_threads: default_onnx_threads(),
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Probability at or above which a claim is classified as fraud,
    /// when the request carries no threshold of its own
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    Threshold::DEFAULT.value()
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum claims processed concurrently
    pub workers: usize,
    /// Seconds between metrics summaries
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path, overlaid by `CLAIMS__*`
    /// environment variables (e.g. `CLAIMS__DETECTION__THRESHOLD=0.6`).
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CLAIMS").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        Threshold::new(self.detection.threshold).context("Invalid detection.threshold")?;

        if self.pipeline.workers == 0 {
            anyhow::bail!("pipeline.workers must be at least 1");
        }
        if self.model.onnx_threads == 0 {
            anyhow::bail!("model.onnx_threads must be at least 1");
        }

        Ok(())
    }

    /// Default decision threshold, validated.
    pub fn default_threshold(&self) -> Result<Threshold> {
        Threshold::new(self.detection.threshold).context("Invalid detection.threshold")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                claim_subject: "claims.requests".to_string(),
                verdict_subject: "claims.verdicts".to_string(),
                queue_group: None,
            },
            model: ModelConfig::default(),
            detection: DetectionConfig {
                threshold: default_threshold(),
            },
            pipeline: PipelineConfig {
                workers: 4,
                metrics_interval_secs: default_metrics_interval(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.detection.threshold, 0.5);
        assert_eq!(config.model.schema, SchemaProfile::ClaimsV1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = AppConfig::default();
        config.detection.threshold = 1.0;
        assert!(config.validate().is_err());

        config.detection.threshold = 0.0;
        assert!(config.default_threshold().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = AppConfig::default();
        config.pipeline.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[nats]
url = "nats://nats:4222"
claim_subject = "claims.in"
verdict_subject = "claims.out"

[model]
path = "models/vehicle.onnx"
schema = "vehicle_claims_v1"

[detection]
threshold = 0.35

[pipeline]
workers = 8

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.nats.claim_subject, "claims.in");
        assert_eq!(config.model.schema, SchemaProfile::VehicleClaimsV1);
        assert_eq!(config.model.name, "fraud_model");
        assert!(config.model.manifest_path.is_none());
        assert_eq!(config.detection.threshold, 0.35);
        assert_eq!(config.pipeline.metrics_interval_secs, 30);
    }
}
