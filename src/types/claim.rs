//! Incoming claim requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Raw claim as submitted by a form or API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Caller-chosen claim identifier
    #[serde(alias = "id")]
    pub claim_id: String,

    /// Raw field values keyed by input name
    #[serde(deserialize_with = "deserialize_raw_fields")]
    pub fields: HashMap<String, String>,

    /// Per-request decision threshold; the configured default applies when absent
    #[serde(default)]
    pub threshold: Option<f64>,

    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

impl ClaimRequest {
    pub fn new(claim_id: String, fields: HashMap<String, String>) -> Self {
        Self {
            claim_id,
            fields,
            threshold: None,
            submitted_at: Utc::now(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

/// Claim with its known outcome, as found in a held-out evaluation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelledClaim {
    #[serde(default, alias = "id")]
    pub claim_id: Option<String>,

    #[serde(deserialize_with = "deserialize_raw_fields")]
    pub fields: HashMap<String, String>,

    /// Whether the claim was confirmed fraudulent
    pub fraud: bool,
}

/// JSON clients send numbers unquoted; keep their text so the encoder sees
/// the same strings a form post would carry.
fn deserialize_raw_fields<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;

    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(<D::Error as serde::de::Error>::custom(format!(
                        "field `{}` must be a string or number, got {}",
                        key, other
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_strings_and_numbers() {
        let json = r#"{
            "id": "clm_42",
            "fields": {"insured_sex": "MALE", "policy_deductable": 500},
            "threshold": 0.65
        }"#;

        let request: ClaimRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.claim_id, "clm_42");
        assert_eq!(request.fields["insured_sex"], "MALE");
        assert_eq!(request.fields["policy_deductable"], "500");
        assert_eq!(request.threshold, Some(0.65));
    }

    #[test]
    fn test_rejects_nested_values() {
        let json = r#"{"claim_id": "c", "fields": {"insured_sex": ["MALE"]}}"#;
        let result: Result<ClaimRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_labelled_claim() {
        let json = r#"[
            {"id": "clm_1", "fields": {"vehicle_price": "Low", "umbrella_limit": 0}, "fraud": true},
            {"fields": {"vehicle_price": "High"}, "fraud": false}
        ]"#;

        let claims: Vec<LabelledClaim> = serde_json::from_str(json).unwrap();

        assert_eq!(claims[0].claim_id.as_deref(), Some("clm_1"));
        assert_eq!(claims[0].fields["umbrella_limit"], "0");
        assert!(claims[0].fraud);
        assert!(claims[1].claim_id.is_none());
        assert!(!claims[1].fraud);
    }

    #[test]
    fn test_threshold_optional() {
        let json = r#"{"claim_id": "c", "fields": {}}"#;
        let request: ClaimRequest = serde_json::from_str(json).unwrap();
        assert!(request.threshold.is_none());
    }
}
