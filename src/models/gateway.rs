//! Inference gateway: encoded record in, verdict out

use crate::config::ModelConfig;
use crate::error::GatewayError;
use crate::models::evaluation::EvaluationReport;
use crate::models::model::FraudModel;
use crate::models::onnx::OnnxModel;
use crate::types::{FeatureRecord, Threshold, Verdict};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Owns the loaded model for the process lifetime and applies the decision
/// rule. Stateless per call; share it behind an `Arc`.
pub struct InferenceGateway {
    model: Arc<dyn FraudModel>,
    default_threshold: Threshold,
}

impl InferenceGateway {
    /// Wrap an already loaded model.
    pub fn new(model: Arc<dyn FraudModel>, default_threshold: Threshold) -> Self {
        info!(
            model = %model.name(),
            version = %model.version(),
            default_threshold = default_threshold.value(),
            "Inference gateway initialized"
        );

        Self {
            model,
            default_threshold,
        }
    }

    /// Load the configured ONNX artifact.
    ///
    /// Fails with [`GatewayError::ModelUnavailable`] when the artifact cannot
    /// be loaded; there is then no gateway and nothing may be served.
    pub fn load(
        config: &ModelConfig,
        model_version: &str,
        default_threshold: Threshold,
    ) -> Result<Self, GatewayError> {
        let model = OnnxModel::load(&config.path, &config.name, model_version, config.onnx_threads)
            .map_err(|e| GatewayError::ModelUnavailable {
                path: config.path.clone(),
                reason: format!("{:#}", e),
            })?;

        Ok(Self::new(Arc::new(model), default_threshold))
    }

    /// Score one record.
    ///
    /// Uses `threshold` when given, otherwise the gateway default. Label is
    /// `Fraud` when `P(fraud) >= threshold`.
    pub fn infer(
        &self,
        record: &FeatureRecord,
        threshold: Option<Threshold>,
    ) -> Result<Verdict, GatewayError> {
        let threshold = threshold.unwrap_or(self.default_threshold);

        let probability = self.model.predict_proba(record).map_err(|e| {
            error!(model = %self.model.name(), error = %e, "Model failed on encoded record");
            GatewayError::Inference {
                model: self.model.name().to_string(),
                reason: format!("{:#}", e),
            }
        })?;

        if !(0.0..=1.0).contains(&probability) {
            error!(model = %self.model.name(), probability = probability, "Model returned invalid probability");
            return Err(GatewayError::Inference {
                model: self.model.name().to_string(),
                reason: format!("probability {} outside [0, 1]", probability),
            });
        }

        let label = threshold.classify(probability);

        debug!(
            model = %self.model.name(),
            probability = probability,
            threshold = threshold.value(),
            label = ?label,
            "Inference complete"
        );

        Ok(Verdict { label, probability })
    }

    /// Score a batch of records, one result per record.
    pub fn infer_batch(
        &self,
        records: &[FeatureRecord],
        threshold: Option<Threshold>,
    ) -> Vec<Result<Verdict, GatewayError>> {
        records.iter().map(|r| self.infer(r, threshold)).collect()
    }

    /// Score a labelled held-out set of `(record, is_fraud)` pairs.
    ///
    /// Any inference failure aborts the evaluation.
    pub fn evaluate(
        &self,
        samples: &[(FeatureRecord, bool)],
        threshold: Option<Threshold>,
    ) -> Result<EvaluationReport, GatewayError> {
        let threshold = threshold.unwrap_or(self.default_threshold);

        let scores = samples
            .iter()
            .map(|(record, is_fraud)| {
                self.infer(record, Some(threshold))
                    .map(|verdict| (verdict.probability, *is_fraud))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let report = EvaluationReport::from_scores(
            self.model.name(),
            self.model.version(),
            threshold,
            &scores,
        );

        info!(
            model = %self.model.name(),
            samples = report.samples,
            accuracy = report.accuracy,
            f1 = report.f1,
            roc_auc = ?report.roc_auc,
            "Evaluation complete"
        );

        Ok(report)
    }

    pub fn default_threshold(&self) -> Threshold {
        self.default_threshold
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_version(&self) -> &str {
        self.model.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_encoder::FeatureEncoder;
    use crate::schema::{ModelManifest, SchemaProfile};
    use crate::types::Label;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed probability and counts calls.
    struct FixedModel {
        probability: f64,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn new(probability: f64) -> Self {
            Self {
                probability,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FraudModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn version(&self) -> &str {
            "test"
        }

        fn predict_proba(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.probability)
        }
    }

    struct BrokenModel;

    impl FraudModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn version(&self) -> &str {
            "test"
        }

        fn predict_proba(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            anyhow::bail!("input shape [1, 12] does not match [1, 19]")
        }
    }

    fn record() -> FeatureRecord {
        let encoder = FeatureEncoder::new(
            SchemaProfile::ClaimsV1.build().unwrap(),
            &ModelManifest::reference(SchemaProfile::ClaimsV1),
        )
        .unwrap();

        let raw: HashMap<String, String> = [
            ("insured_sex", "FEMALE"),
            ("insured_education", "College"),
            ("insured_hobbies", "Travel"),
            ("insured_relationship", "Wife"),
            ("vehicle_price", "High"),
            ("base_policy", "All Perils"),
            ("policy_deductable", "2000"),
            ("days_policy_inception", "12"),
            ("umbrella_limit", "5000000"),
            ("capital_gains", "35100"),
            ("capital_loss", "0"),
            ("incident_hour_of_the_day", "3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        encoder.encode(&raw).unwrap()
    }

    fn gateway(probability: f64) -> InferenceGateway {
        InferenceGateway::new(Arc::new(FixedModel::new(probability)), Threshold::DEFAULT)
    }

    #[test]
    fn test_fixed_probability_against_thresholds() {
        let gateway = gateway(0.7);
        let record = record();

        let at_half = gateway.infer(&record, Some(Threshold::new(0.5).unwrap())).unwrap();
        assert_eq!(at_half.label, Label::Fraud);
        assert_eq!(at_half.probability, 0.7);

        let at_high = gateway.infer(&record, Some(Threshold::new(0.8).unwrap())).unwrap();
        assert_eq!(at_high.label, Label::Legitimate);
    }

    #[test]
    fn test_default_threshold_applies() {
        let record = record();
        assert_eq!(gateway(0.5).infer(&record, None).unwrap().label, Label::Fraud);
        assert_eq!(gateway(0.49).infer(&record, None).unwrap().label, Label::Legitimate);

        let strict = InferenceGateway::new(
            Arc::new(FixedModel::new(0.6)),
            Threshold::new(0.65).unwrap(),
        );
        assert_eq!(strict.infer(&record, None).unwrap().label, Label::Legitimate);
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let record = record();

        for p in [0.0, 0.1, 0.33, 0.5, 0.61, 0.9, 1.0] {
            let gateway = gateway(p);
            let mut seen_legitimate = false;
            for step in 1..100 {
                let threshold = Threshold::new(step as f64 / 100.0).unwrap();
                let label = gateway.infer(&record, Some(threshold)).unwrap().label;
                if label == Label::Legitimate {
                    seen_legitimate = true;
                } else {
                    assert!(!seen_legitimate, "p={} flipped back to fraud at {}", p, step);
                }
            }
        }
    }

    #[test]
    fn test_model_error_becomes_inference_error() {
        let gateway = InferenceGateway::new(Arc::new(BrokenModel), Threshold::DEFAULT);

        match gateway.infer(&record(), None) {
            Err(GatewayError::Inference { model, reason }) => {
                assert_eq!(model, "broken");
                assert!(reason.contains("does not match"));
            }
            other => panic!("expected inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        for p in [1.2, -0.1, f64::NAN] {
            assert!(matches!(
                gateway(p).infer(&record(), None),
                Err(GatewayError::Inference { .. })
            ));
        }
    }

    #[test]
    fn test_batch_calls_model_per_record() {
        let model = Arc::new(FixedModel::new(0.9));
        let gateway = InferenceGateway::new(model.clone(), Threshold::DEFAULT);
        let records = vec![record(), record(), record()];

        let verdicts = gateway.infer_batch(&records, None);

        assert_eq!(verdicts.len(), 3);
        assert!(verdicts.iter().all(|v| v.as_ref().unwrap().label == Label::Fraud));
        assert_eq!(model.calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_predict_uses_native_cutoff() {
        let record = record();
        assert_eq!(FixedModel::new(0.5).predict(&record).unwrap(), Label::Fraud);
        assert_eq!(FixedModel::new(0.2).predict(&record).unwrap(), Label::Legitimate);
    }

    /// Replays a queue of probabilities, one per call.
    struct ScriptedModel {
        probabilities: std::sync::Mutex<Vec<f64>>,
    }

    impl FraudModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn version(&self) -> &str {
            "test"
        }

        fn predict_proba(&self, _record: &FeatureRecord) -> anyhow::Result<f64> {
            let mut queue = self.probabilities.lock().unwrap();
            anyhow::ensure!(!queue.is_empty(), "no scripted probability left");
            Ok(queue.remove(0))
        }
    }

    #[test]
    fn test_evaluate_labelled_set() {
        let model = ScriptedModel {
            probabilities: std::sync::Mutex::new(vec![0.9, 0.3, 0.6, 0.2]),
        };
        let gateway = InferenceGateway::new(Arc::new(model), Threshold::DEFAULT);
        let samples = vec![
            (record(), true),
            (record(), true),
            (record(), false),
            (record(), false),
        ];

        let report = gateway.evaluate(&samples, None).unwrap();

        assert_eq!(report.model, "scripted");
        assert_eq!(report.samples, 4);
        assert_eq!(report.confusion_matrix, [[1, 1], [1, 1]]);
        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.roc_auc, Some(0.75));

        let strict = InferenceGateway::new(
            Arc::new(ScriptedModel {
                probabilities: std::sync::Mutex::new(vec![0.9, 0.3, 0.6, 0.2]),
            }),
            Threshold::DEFAULT,
        );
        let report = strict
            .evaluate(&samples, Some(Threshold::new(0.8).unwrap()))
            .unwrap();
        assert_eq!(report.threshold, 0.8);
        assert_eq!(report.confusion_matrix, [[2, 0], [1, 1]]);
        assert_eq!(report.precision, 1.0);
    }

    #[test]
    fn test_evaluate_stops_on_model_failure() {
        let gateway = InferenceGateway::new(Arc::new(BrokenModel), Threshold::DEFAULT);
        let samples = vec![(record(), true)];

        assert!(matches!(
            gateway.evaluate(&samples, None),
            Err(GatewayError::Inference { .. })
        ));
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let config = ModelConfig {
            path: "/nonexistent/fraud_model.onnx".to_string(),
            ..ModelConfig::default()
        };

        match InferenceGateway::load(&config, "missing", Threshold::DEFAULT) {
            Err(GatewayError::ModelUnavailable { path, .. }) => {
                assert_eq!(path, "/nonexistent/fraud_model.onnx")
            }
            Err(other) => panic!("expected ModelUnavailable, got {:?}", other),
            Ok(_) => panic!("expected ModelUnavailable"),
        }
    }
}
