//! Claim Fraud Pipeline - Main Entry Point
//!
//! Consumes claim requests from NATS, encodes and scores them, and publishes
//! verdicts. Refuses to start when the model or its schema is unusable.

use anyhow::{Context, Result};
use claim_fraud_pipeline::{
    config::{AppConfig, LoggingConfig},
    consumer::{claim_id_hint, decode_claim, ClaimConsumer},
    metrics::{MetricsReporter, PipelineMetrics},
    ClaimProcessor, FeatureEncoder, InferenceGateway, ModelManifest, VerdictProducer,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Claim Fraud Pipeline");
    info!(
        schema = ?config.model.schema,
        threshold = config.detection.threshold,
        "Configuration loaded successfully"
    );

    // Schema must match the trained model before anything is served
    let manifest = ModelManifest::resolve(&config.model)?;
    let schema = config.model.schema.build()?;
    let encoder = Arc::new(
        FeatureEncoder::new(schema, &manifest).context("Feature schema does not match model")?,
    );
    info!(
        "Feature encoder initialized ({} features)",
        encoder.feature_count()
    );

    let gateway = match InferenceGateway::load(
        &config.model,
        &manifest.model_version,
        config.default_threshold()?,
    ) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!(error = %e, "Model unavailable, refusing to serve");
            return Err(e.into());
        }
    };

    let metrics = Arc::new(PipelineMetrics::new());
    let processor = Arc::new(ClaimProcessor::new(encoder, gateway, metrics.clone()));

    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = ClaimConsumer::new(
        client.clone(),
        &config.nats.claim_subject,
        config.nats.queue_group.clone(),
    );
    let producer = Arc::new(VerdictProducer::new(client.clone(), &config.nats.verdict_subject));

    let num_workers = config.pipeline.workers;
    info!(
        "Starting claim processing loop with {} parallel workers",
        num_workers
    );
    info!("Publishing verdicts to: {}", producer.subject());

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));

    let reporter = MetricsReporter::new(metrics.clone(), config.pipeline.metrics_interval_secs);
    tokio::spawn(reporter.start());

    let mut subscription = consumer.subscribe().await?;

    loop {
        let message = tokio::select! {
            message = subscription.next() => match message {
                Some(message) => message,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        };

        let permit = semaphore.clone().acquire_owned().await?;
        let processor = processor.clone();
        let producer = producer.clone();

        tokio::spawn(async move {
            let verdict = match decode_claim(&message.payload) {
                Ok(request) => processor.process(&request),
                Err(e) => processor.reject_malformed(claim_id_hint(&message.payload), &e),
            };

            if let Err(e) = producer.publish(&verdict, message.reply.as_ref()).await {
                error!(
                    claim_id = %verdict.claim_id,
                    error = %e,
                    "Failed to publish verdict"
                );
            }

            drop(permit);
        });
    }

    // Wait for in-flight claims before the final summary
    let _ = semaphore.acquire_many(num_workers as u32).await?;
    client.flush().await?;

    info!("Pipeline shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("claim_fraud_pipeline={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}
