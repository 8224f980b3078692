//! Model Evaluation
//!
//! Scores a labelled held-out set of claims with the configured model and
//! writes accuracy, precision, recall, F1, ROC-AUC and the confusion matrix
//! to a JSON report.

use anyhow::{Context, Result};
use claim_fraud_pipeline::{
    AppConfig, FeatureEncoder, InferenceGateway, LabelledClaim, ModelManifest,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("evaluate_model=info".parse()?)
                .add_directive("claim_fraud_pipeline=info".parse()?),
        )
        .init();

    // Positional arguments: dataset output config
    let args: Vec<String> = std::env::args().collect();
    let dataset_path = args
        .get(1)
        .context("usage: evaluate-model <labelled_claims.json> [metrics.json] [config.toml]")?;
    let output_path = args.get(2).map(|s| s.as_str()).unwrap_or("models/metrics.json");
    let config_path = args.get(3).map(|s| s.as_str()).unwrap_or("config/config.toml");

    let config = AppConfig::load_from_path(config_path)?;
    info!(
        dataset = %dataset_path,
        output = %output_path,
        schema = ?config.model.schema,
        "Starting model evaluation"
    );

    let manifest = ModelManifest::resolve(&config.model)?;
    let encoder = FeatureEncoder::new(config.model.schema.build()?, &manifest)
        .context("Feature schema does not match model")?;
    let gateway =
        InferenceGateway::load(&config.model, &manifest.model_version, config.default_threshold()?)?;

    let contents = std::fs::read_to_string(dataset_path)
        .with_context(|| format!("Failed to read {}", dataset_path))?;
    let claims: Vec<LabelledClaim> =
        serde_json::from_str(&contents).context("Failed to parse labelled claims")?;

    let mut samples = Vec::with_capacity(claims.len());
    let mut skipped = 0;
    for (index, claim) in claims.iter().enumerate() {
        match encoder.encode(&claim.fields) {
            Ok(record) => samples.push((record, claim.fraud)),
            Err(e) => {
                skipped += 1;
                warn!(
                    row = index,
                    claim_id = ?claim.claim_id,
                    error = %e,
                    "Skipping claim that fails encoding"
                );
            }
        }
    }

    info!(
        "Encoded {} of {} claims ({} skipped)",
        samples.len(),
        claims.len(),
        skipped
    );

    let report = gateway.evaluate(&samples, None)?;
    report.write_json(output_path)?;

    info!(
        accuracy = report.accuracy,
        precision = report.precision,
        recall = report.recall,
        f1 = report.f1,
        roc_auc = ?report.roc_auc,
        "Evaluation finished"
    );

    Ok(())
}
