//! Type definitions for the claim fraud pipeline

pub mod claim;
pub mod record;
pub mod verdict;

pub use claim::{ClaimRequest, LabelledClaim};
pub use record::{FeatureRecord, FeatureValue};
pub use verdict::{
    Label, Outcome, Threshold, Verdict, VerdictMessage, MALFORMED_REQUEST, UNKNOWN_CLAIM_ID,
};
