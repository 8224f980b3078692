//! Feature encoding for claim fraud model inference.
//!
//! Turns the raw string fields of a claim into a [`FeatureRecord`] laid out
//! exactly as the model was trained: same feature names, same order, same
//! categorical codes. Malformed input fails loudly; nothing is coerced.

use crate::error::{EncodeError, EncodeResult, SchemaError};
use crate::schema::{FeatureSchema, FieldKind, FieldSpec, ModelManifest};
use crate::types::record::{FeatureRecord, FeatureValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Encoder bound to a schema that has been checked against the model.
pub struct FeatureEncoder {
    schema: Arc<FeatureSchema>,
    model_version: String,
}

impl FeatureEncoder {
    /// Create an encoder, validating the schema against the model manifest.
    ///
    /// A mismatch here is a deployment bug; callers should refuse to serve.
    pub fn new(schema: FeatureSchema, manifest: &ModelManifest) -> Result<Self, SchemaError> {
        schema.validate_against(&manifest.feature_names)?;

        info!(
            schema = %schema.name(),
            model_version = %manifest.model_version,
            features = schema.len(),
            "Feature schema matches model manifest"
        );

        Ok(Self {
            schema: Arc::new(schema),
            model_version: manifest.model_version.clone(),
        })
    }

    /// Encode raw claim fields.
    ///
    /// Fields are checked in schema order and the first failure is returned.
    /// Keys outside the schema are reported after all schema fields pass.
    pub fn encode(&self, raw: &HashMap<String, String>) -> EncodeResult<FeatureRecord> {
        let mut values = Vec::with_capacity(self.schema.len());

        for field in self.schema.fields() {
            let text = raw
                .get(field.input_name())
                .ok_or_else(|| EncodeError::MissingField {
                    field: field.input_name().to_string(),
                })?;
            values.push(encode_field(field, text)?);
        }

        if let Some(extra) = raw
            .keys()
            .filter(|key| self.schema.field(key).is_none())
            .min()
        {
            return Err(EncodeError::UnexpectedField {
                field: extra.clone(),
            });
        }

        Ok(FeatureRecord::new(self.schema.feature_names().clone(), values))
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Get feature names in model order.
    pub fn feature_names(&self) -> &[String] {
        self.schema.feature_names()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Version of the model manifest this encoder was validated against.
    pub fn model_version(&self) -> &str {
        &self.model_version
    }
}

fn encode_field(field: &FieldSpec, text: &str) -> EncodeResult<FeatureValue> {
    let name = field.input_name();

    match field.kind() {
        FieldKind::Categorical(codebook) => codebook
            .code(text)
            .map(FeatureValue::Code)
            .ok_or_else(|| EncodeError::UnknownCategory {
                field: name.to_string(),
                value: text.to_string(),
            }),
        FieldKind::Integer { min, max } => {
            let value: i64 = text.trim().parse().map_err(|_| invalid_number(name, text))?;
            let below = min.map_or(false, |min| value < min);
            let above = max.map_or(false, |max| value > max);
            if below || above {
                return Err(EncodeError::OutOfRange {
                    field: name.to_string(),
                    value: value as f64,
                    min: min.map(|v| v as f64),
                    max: max.map(|v| v as f64),
                });
            }
            Ok(FeatureValue::Int(value))
        }
        FieldKind::Float { min, max } => {
            let value: f64 = text.trim().parse().map_err(|_| invalid_number(name, text))?;
            if !value.is_finite() {
                return Err(invalid_number(name, text));
            }
            let below = min.map_or(false, |min| value < min);
            let above = max.map_or(false, |max| value > max);
            if below || above {
                return Err(EncodeError::OutOfRange {
                    field: name.to_string(),
                    value,
                    min: *min,
                    max: *max,
                });
            }
            Ok(FeatureValue::Float(value))
        }
    }
}

fn invalid_number(field: &str, text: &str) -> EncodeError {
    EncodeError::InvalidNumber {
        field: field.to_string(),
        value: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CategoryCodebook, SchemaProfile};

    fn claims_encoder() -> FeatureEncoder {
        FeatureEncoder::new(
            SchemaProfile::ClaimsV1.build().unwrap(),
            &ModelManifest::reference(SchemaProfile::ClaimsV1),
        )
        .unwrap()
    }

    fn sample_claim() -> HashMap<String, String> {
        [
            ("insured_sex", "MALE"),
            ("insured_education", "Masters"),
            ("insured_hobbies", "Reading"),
            ("insured_relationship", "Husband"),
            ("vehicle_price", "Low"),
            ("base_policy", "Liability"),
            ("policy_deductable", "500"),
            ("days_policy_inception", "30"),
            ("umbrella_limit", "0"),
            ("capital_gains", "0"),
            ("capital_loss", "0"),
            ("incident_hour_of_the_day", "14"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_feature_encoding() {
        let encoder = claims_encoder();
        let record = encoder.encode(&sample_claim()).unwrap();

        assert_eq!(record.len(), encoder.feature_count());
        assert_eq!(record.get("insured_education"), Some(FeatureValue::Code(3)));
        assert_eq!(record.get("policy_deductable"), Some(FeatureValue::Int(500)));
        assert_eq!(record.get("capital-gains"), Some(FeatureValue::Int(0)));
        assert_eq!(record.get("capital_gains"), None);
        assert_eq!(
            record.to_f32_vec(),
            vec![0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 500.0, 30.0, 0.0, 0.0, 0.0, 14.0]
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let encoder = claims_encoder();
        let first = encoder.encode(&sample_claim()).unwrap();
        for _ in 0..10 {
            assert_eq!(encoder.encode(&sample_claim()).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_category_names_field() {
        let encoder = claims_encoder();

        for field in [
            "insured_sex",
            "insured_education",
            "insured_hobbies",
            "insured_relationship",
            "vehicle_price",
            "base_policy",
        ] {
            let mut claim = sample_claim();
            claim.insert(field.to_string(), "Unknown".to_string());

            match encoder.encode(&claim) {
                Err(EncodeError::UnknownCategory { field: named, value }) => {
                    assert_eq!(named, field);
                    assert_eq!(value, "Unknown");
                }
                other => panic!("expected UnknownCategory for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_category_lookup_is_case_sensitive() {
        let mut claim = sample_claim();
        claim.insert("insured_sex".to_string(), "male".to_string());
        assert!(matches!(
            claims_encoder().encode(&claim),
            Err(EncodeError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_invalid_number() {
        let encoder = claims_encoder();

        for bad in ["", "abc", "500.5", "5e2", "NaN"] {
            let mut claim = sample_claim();
            claim.insert("policy_deductable".to_string(), bad.to_string());
            assert!(
                matches!(
                    encoder.encode(&claim),
                    Err(EncodeError::InvalidNumber { ref field, .. }) if field == "policy_deductable"
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let mut claim = sample_claim();
        claim.insert("policy_deductable".to_string(), " 1000 ".to_string());
        let record = claims_encoder().encode(&claim).unwrap();
        assert_eq!(record.get("policy_deductable"), Some(FeatureValue::Int(1000)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let encoder = claims_encoder();

        for accepted in ["0", "23"] {
            let mut claim = sample_claim();
            claim.insert("incident_hour_of_the_day".to_string(), accepted.to_string());
            assert!(encoder.encode(&claim).is_ok());
        }

        for rejected in ["-1", "24"] {
            let mut claim = sample_claim();
            claim.insert("incident_hour_of_the_day".to_string(), rejected.to_string());
            assert!(matches!(
                encoder.encode(&claim),
                Err(EncodeError::OutOfRange { ref field, .. }) if field == "incident_hour_of_the_day"
            ));
        }

        let mut claim = sample_claim();
        claim.insert("umbrella_limit".to_string(), "-1".to_string());
        assert!(matches!(
            encoder.encode(&claim),
            Err(EncodeError::OutOfRange { min: Some(_), max: None, .. })
        ));
    }

    #[test]
    fn test_unbounded_field_accepts_negative() {
        let mut claim = sample_claim();
        claim.insert("capital_loss".to_string(), "-52800".to_string());
        let record = claims_encoder().encode(&claim).unwrap();
        assert_eq!(record.get("capital-loss"), Some(FeatureValue::Int(-52800)));
    }

    #[test]
    fn test_missing_and_unexpected_fields() {
        let encoder = claims_encoder();

        let mut missing = sample_claim();
        missing.remove("base_policy");
        assert_eq!(
            encoder.encode(&missing),
            Err(EncodeError::MissingField {
                field: "base_policy".to_string()
            })
        );

        let mut extra = sample_claim();
        extra.insert("zip".to_string(), "12345".to_string());
        extra.insert("capital-gains".to_string(), "0".to_string());
        assert_eq!(
            encoder.encode(&extra),
            Err(EncodeError::UnexpectedField {
                field: "capital-gains".to_string()
            })
        );
    }

    #[test]
    fn test_first_failure_in_schema_order() {
        let mut claim = sample_claim();
        claim.insert("insured_hobbies".to_string(), "Chess".to_string());
        claim.insert("incident_hour_of_the_day".to_string(), "99".to_string());
        claim.insert("unknown".to_string(), "x".to_string());

        let err = claims_encoder().encode(&claim).unwrap_err();
        assert_eq!(err.field(), "insured_hobbies");
    }

    #[test]
    fn test_schema_mismatch_refused() {
        let mut manifest = ModelManifest::reference(SchemaProfile::ClaimsV1);
        manifest.feature_names[9] = "capital_gains".to_string();

        let result = FeatureEncoder::new(SchemaProfile::ClaimsV1.build().unwrap(), &manifest);
        assert!(matches!(result, Err(SchemaError::Mismatch { position: 9, .. })));
    }

    #[test]
    fn test_float_fields() {
        let schema = FeatureSchema::new(
            "ratios",
            vec![
                FieldSpec::float("loss_ratio", Some(0.0), Some(1.0)),
                FieldSpec::categorical("fault", CategoryCodebook::ordinal(&["Policy Holder", "Third Party"])),
            ],
        )
        .unwrap();
        let manifest = ModelManifest {
            model_version: "test".to_string(),
            feature_names: vec!["loss_ratio".to_string(), "fault".to_string()],
        };
        let encoder = FeatureEncoder::new(schema, &manifest).unwrap();

        let raw = |ratio: &str| -> HashMap<String, String> {
            HashMap::from([
                ("loss_ratio".to_string(), ratio.to_string()),
                ("fault".to_string(), "Third Party".to_string()),
            ])
        };

        let record = encoder.encode(&raw("0.25")).unwrap();
        assert_eq!(record.get("loss_ratio"), Some(FeatureValue::Float(0.25)));
        assert_eq!(record.get("fault"), Some(FeatureValue::Code(1)));

        assert!(encoder.encode(&raw("1.0")).is_ok());
        assert!(matches!(encoder.encode(&raw("1.01")), Err(EncodeError::OutOfRange { .. })));
        assert!(matches!(encoder.encode(&raw("inf")), Err(EncodeError::InvalidNumber { .. })));
    }

    #[test]
    fn test_vehicle_schema_encoding() {
        let encoder = FeatureEncoder::new(
            SchemaProfile::VehicleClaimsV1.build().unwrap(),
            &ModelManifest::reference(SchemaProfile::VehicleClaimsV1),
        )
        .unwrap();

        let raw: HashMap<String, String> = [
            ("Month", "Dec"),
            ("WeekOfMonth", "5"),
            ("DayOfWeek", "Wednesday"),
            ("Make", "Honda"),
            ("AccidentArea", "Urban"),
            ("Sex", "Female"),
            ("MaritalStatus", "Single"),
            ("Age", "21"),
            ("Fault", "Policy Holder"),
            ("PolicyType", "Sport - Liability"),
            ("VehicleCategory", "Sport"),
            ("VehiclePrice", "more than 69000"),
            ("PastNumberOfClaims", "none"),
            ("AgeOfVehicle", "3 years"),
            ("PoliceReportFiled", "No"),
            ("WitnessPresent", "No"),
            ("AgentType", "External"),
            ("NumberOfCars", "3 to 4"),
            ("BasePolicy", "Liability"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let record = encoder.encode(&raw).unwrap();
        assert_eq!(record.len(), 19);
        assert_eq!(record.get("Month"), Some(FeatureValue::Code(11)));
        assert_eq!(record.get("WeekOfMonth"), Some(FeatureValue::Int(5)));
        assert_eq!(record.get("VehiclePrice"), Some(FeatureValue::Code(5)));

        let mut bad_week = raw.clone();
        bad_week.insert("WeekOfMonth".to_string(), "6".to_string());
        assert!(matches!(encoder.encode(&bad_week), Err(EncodeError::OutOfRange { .. })));
    }
}
