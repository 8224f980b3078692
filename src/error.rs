//! Error taxonomy for claim encoding, schema validation and inference.

use thiserror::Error;

/// Result alias for encoder operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Client-input errors raised while encoding a raw claim.
///
/// Every variant names the offending input field so callers can point the
/// user at it. These are recoverable per request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("field `{field}` has unknown category {value:?}")]
    UnknownCategory { field: String, value: String },

    #[error("field `{field}` expects a number, got {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("field `{field}` value {value} is outside {}", describe_bounds(.min, .max))]
    OutOfRange {
        field: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("required field `{field}` is missing")]
    MissingField { field: String },

    #[error("field `{field}` is not part of the model schema")]
    UnexpectedField { field: String },
}

impl EncodeError {
    /// Stable machine-readable kind, used in rejection messages and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EncodeError::UnknownCategory { .. } => "unknown_category",
            EncodeError::InvalidNumber { .. } => "invalid_number",
            EncodeError::OutOfRange { .. } => "out_of_range",
            EncodeError::MissingField { .. } => "missing_field",
            EncodeError::UnexpectedField { .. } => "unexpected_field",
        }
    }

    /// Input field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            EncodeError::UnknownCategory { field, .. }
            | EncodeError::InvalidNumber { field, .. }
            | EncodeError::OutOfRange { field, .. }
            | EncodeError::MissingField { field }
            | EncodeError::UnexpectedField { field } => field,
        }
    }
}

fn describe_bounds(min: &Option<f64>, max: &Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{}, {}]", min, max),
        (Some(min), None) => format!("[{}, +inf)", min),
        (None, Some(max)) => format!("(-inf, {}]", max),
        (None, None) => "(-inf, +inf)".to_string(),
    }
}

/// Deployment errors: the encoder schema does not line up with the model.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema has {found} features but the model expects {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("feature #{position} is `{found}` but the model expects `{expected}`")]
    Mismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("categorical field `{0}` has an empty codebook")]
    EmptyCodebook(String),

    #[error("categorical field `{0}` lists the same label twice")]
    DuplicateCategory(String),

    #[error("categorical field `{0}` maps two labels to one code")]
    DuplicateCode(String),

    #[error("failed to read model manifest {path}: {reason}")]
    Manifest { path: String, reason: String },
}

/// Errors raised by the inference gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The model artifact could not be loaded; the process must not serve.
    #[error("model unavailable ({path}): {reason}")]
    ModelUnavailable { path: String, reason: String },

    /// The model failed on an encoded record. Indicates a schema gap.
    #[error("inference failed in model `{model}`: {reason}")]
    Inference { model: String, reason: String },

    #[error("threshold {0} must lie strictly between 0 and 1")]
    InvalidThreshold(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_error_names_field() {
        let err = EncodeError::UnknownCategory {
            field: "insured_sex".to_string(),
            value: "male".to_string(),
        };
        assert_eq!(err.field(), "insured_sex");
        assert_eq!(err.kind(), "unknown_category");
        assert!(err.to_string().contains("insured_sex"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = EncodeError::OutOfRange {
            field: "incident_hour_of_the_day".to_string(),
            value: 24.0,
            min: Some(0.0),
            max: Some(23.0),
        };
        assert_eq!(
            err.to_string(),
            "field `incident_hour_of_the_day` value 24 is outside [0, 23]"
        );

        let open = EncodeError::OutOfRange {
            field: "umbrella_limit".to_string(),
            value: -1.0,
            min: Some(0.0),
            max: None,
        };
        assert!(open.to_string().ends_with("[0, +inf)"));
    }
}
