//! Verdicts and the messages that carry them

use crate::error::{EncodeError, GatewayError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rejection kind for payloads that are not a readable claim request.
pub const MALFORMED_REQUEST: &str = "malformed_request";

/// Claim id reported when a malformed payload carries none.
pub const UNKNOWN_CLAIM_ID: &str = "unknown";

/// Classification outcome for a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Fraud,
    Legitimate,
}

impl Label {
    /// Display text shown to claim handlers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fraud => "Fraudulent",
            Label::Legitimate => "Not Fraudulent",
        }
    }

    pub fn is_fraud(&self) -> bool {
        matches!(self, Label::Fraud)
    }
}

/// Probability cutoff: a claim at or above it is classified as fraud.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    /// Threshold used when the caller supplies none.
    pub const DEFAULT: Threshold = Threshold(0.5);

    /// Accepts values strictly between 0 and 1.
    pub fn new(value: f64) -> Result<Self, GatewayError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(GatewayError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Apply the decision rule to a fraud probability.
    pub fn classify(&self, probability: f64) -> Label {
        if probability >= self.0 {
            Label::Fraud
        } else {
            Label::Legitimate
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of scoring one claim. Created per request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    /// P(fraud) in [0, 1]
    pub probability: f64,
}

impl Verdict {
    /// Probability formatted as a percentage, e.g. `"70.00%"`.
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// What happened to a claim request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Scored {
        label: Label,
        probability: f64,
        threshold: f64,
        model: String,
        model_version: String,
    },
    /// The request failed validation; the model was not called.
    Rejected {
        error_kind: String,
        field: String,
        message: String,
    },
    /// The model failed on a record that passed encoding.
    Failed { message: String },
}

/// Message published for every processed claim request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictMessage {
    /// Unique identifier of this message
    pub verdict_id: String,

    /// Claim the verdict belongs to
    pub claim_id: String,

    #[serde(flatten)]
    pub outcome: Outcome,

    /// When the verdict was produced
    pub timestamp: DateTime<Utc>,
}

impl VerdictMessage {
    pub fn new(claim_id: String, outcome: Outcome) -> Self {
        Self {
            verdict_id: uuid::Uuid::new_v4().to_string(),
            claim_id,
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn scored(
        claim_id: String,
        verdict: Verdict,
        threshold: Threshold,
        model: &str,
        model_version: &str,
    ) -> Self {
        Self::new(
            claim_id,
            Outcome::Scored {
                label: verdict.label,
                probability: verdict.probability,
                threshold: threshold.value(),
                model: model.to_string(),
                model_version: model_version.to_string(),
            },
        )
    }

    pub fn rejected(claim_id: String, error: &EncodeError) -> Self {
        Self::new(
            claim_id,
            Outcome::Rejected {
                error_kind: error.kind().to_string(),
                field: error.field().to_string(),
                message: error.to_string(),
            },
        )
    }

    /// The request carried a threshold outside (0, 1).
    pub fn rejected_threshold(claim_id: String, error: &GatewayError) -> Self {
        Self::new(
            claim_id,
            Outcome::Rejected {
                error_kind: "invalid_threshold".to_string(),
                field: "threshold".to_string(),
                message: error.to_string(),
            },
        )
    }

    /// The payload could not be read as a claim request at all.
    pub fn malformed(claim_id: String, error: &anyhow::Error) -> Self {
        Self::new(
            claim_id,
            Outcome::Rejected {
                error_kind: MALFORMED_REQUEST.to_string(),
                field: String::new(),
                message: format!("{:#}", error),
            },
        )
    }

    pub fn failed(claim_id: String, error: &GatewayError) -> Self {
        Self::new(
            claim_id,
            Outcome::Failed {
                message: error.to_string(),
            },
        )
    }

    /// Label when the claim was scored.
    pub fn label(&self) -> Option<Label> {
        match &self.outcome {
            Outcome::Scored { label, .. } => Some(*label),
            _ => None,
        }
    }
}
