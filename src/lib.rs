//! Claim Fraud Pipeline Library
//!
//! Scores insurance claims for fraud: raw form fields are encoded into the
//! exact feature layout a trained classifier expects, the classifier is run,
//! and its probability is turned into a verdict under a decision threshold.

pub mod config;
pub mod consumer;
pub mod error;
pub mod feature_encoder;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod producer;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use consumer::ClaimConsumer;
pub use error::{EncodeError, GatewayError, SchemaError};
pub use feature_encoder::FeatureEncoder;
pub use models::{EvaluationReport, FraudModel, InferenceGateway};
pub use pipeline::ClaimProcessor;
pub use producer::VerdictProducer;
pub use schema::{FeatureSchema, ModelManifest, SchemaProfile};
pub use types::{ClaimRequest, FeatureRecord, LabelledClaim, Label, Threshold, Verdict, VerdictMessage};
