//! The classifier contract the gateway depends on

use crate::types::{FeatureRecord, Label};
use anyhow::Result;

/// A trained fraud classifier.
///
/// Loaded once and never mutated afterwards, so implementations are shared
/// across request tasks behind an `Arc`.
pub trait FraudModel: Send + Sync {
    /// Model name for logs and verdict messages
    fn name(&self) -> &str;

    /// Version of the trained artifact
    fn version(&self) -> &str;

    /// Probability that the claim is fraudulent (class 1).
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64>;

    /// The classifier's own decision, at its native 0.5 cutoff.
    fn predict(&self, record: &FeatureRecord) -> Result<Label> {
        let probability = self.predict_proba(record)?;
        Ok(if probability >= 0.5 {
            Label::Fraud
        } else {
            Label::Legitimate
        })
    }
}
