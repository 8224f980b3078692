//! Per-claim processing: encode, infer, build the verdict message.

use crate::feature_encoder::FeatureEncoder;
use crate::metrics::PipelineMetrics;
use crate::models::InferenceGateway;
use crate::types::{ClaimRequest, Threshold, VerdictMessage, MALFORMED_REQUEST, UNKNOWN_CLAIM_ID};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Runs one claim request through the encoder and the gateway.
///
/// Encoding errors stop the claim before the model is called.
pub struct ClaimProcessor {
    encoder: Arc<FeatureEncoder>,
    gateway: Arc<InferenceGateway>,
    metrics: Arc<PipelineMetrics>,
}

impl ClaimProcessor {
    pub fn new(
        encoder: Arc<FeatureEncoder>,
        gateway: Arc<InferenceGateway>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            encoder,
            gateway,
            metrics,
        }
    }

    /// Process a claim and describe the outcome.
    pub fn process(&self, request: &ClaimRequest) -> VerdictMessage {
        let start_time = Instant::now();
        let claim_id = request.claim_id.clone();

        let threshold = match request.threshold.map(Threshold::new).transpose() {
            Ok(threshold) => threshold.unwrap_or_else(|| self.gateway.default_threshold()),
            Err(e) => {
                warn!(claim_id = %claim_id, error = %e, "Claim rejected: bad threshold");
                self.metrics
                    .record_rejection(start_time.elapsed(), "invalid_threshold");
                return VerdictMessage::rejected_threshold(claim_id, &e);
            }
        };

        let record = match self.encoder.encode(&request.fields) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    claim_id = %claim_id,
                    field = %e.field(),
                    kind = e.kind(),
                    error = %e,
                    "Claim rejected by encoder"
                );
                self.metrics.record_rejection(start_time.elapsed(), e.kind());
                return VerdictMessage::rejected(claim_id, &e);
            }
        };

        match self.gateway.infer(&record, Some(threshold)) {
            Ok(verdict) => {
                let processing_time = start_time.elapsed();
                self.metrics
                    .record_verdict(processing_time, verdict.label, verdict.probability);

                if verdict.label.is_fraud() {
                    info!(
                        claim_id = %claim_id,
                        probability = verdict.probability,
                        threshold = threshold.value(),
                        processing_time_us = processing_time.as_micros(),
                        "Fraud verdict"
                    );
                } else {
                    debug!(
                        claim_id = %claim_id,
                        probability = verdict.probability,
                        processing_time_us = processing_time.as_micros(),
                        "Claim scored legitimate"
                    );
                }

                VerdictMessage::scored(
                    claim_id,
                    verdict,
                    threshold,
                    self.gateway.model_name(),
                    self.gateway.model_version(),
                )
            }
            Err(e) => {
                // Encoded records should always fit the model
                error!(claim_id = %claim_id, error = %e, "Inference failed after encoding passed");
                self.metrics.record_inference_failure();
                VerdictMessage::failed(claim_id, &e)
            }
        }
    }

    /// Describe a payload that could not be decoded as a claim request.
    pub fn reject_malformed(&self, claim_id: Option<String>, error: &anyhow::Error) -> VerdictMessage {
        let claim_id = claim_id.unwrap_or_else(|| UNKNOWN_CLAIM_ID.to_string());

        warn!(claim_id = %claim_id, error = %format!("{:#}", error), "Claim request malformed");
        self.metrics
            .record_rejection(Duration::ZERO, MALFORMED_REQUEST);

        VerdictMessage::malformed(claim_id, error)
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }
}
