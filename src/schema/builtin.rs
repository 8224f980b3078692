//! Bundled schemas for the trained claim models.
//!
//! Field order is the training column order and must not be changed without
//! retraining; the model manifest is checked against it at startup.

use super::{CategoryCodebook, FeatureSchema, FieldSpec};
use crate::error::SchemaError;

/// Feature names of the claims model, in training order.
pub const CLAIMS_V1_FEATURES: [&str; 12] = [
    "insured_sex",
    "insured_education",
    "insured_hobbies",
    "insured_relationship",
    "vehicle_price",
    "base_policy",
    "policy_deductable",
    "days_policy_inception",
    "umbrella_limit",
    "capital-gains",
    "capital-loss",
    "incident_hour_of_the_day",
];

/// Feature names of the vehicle insurance model, in training order.
pub const VEHICLE_CLAIMS_V1_FEATURES: [&str; 19] = [
    "Month",
    "WeekOfMonth",
    "DayOfWeek",
    "Make",
    "AccidentArea",
    "Sex",
    "MaritalStatus",
    "Age",
    "Fault",
    "PolicyType",
    "VehicleCategory",
    "VehiclePrice",
    "PastNumberOfClaims",
    "AgeOfVehicle",
    "PoliceReportFiled",
    "WitnessPresent",
    "AgentType",
    "NumberOfCars",
    "BasePolicy",
];

/// Insurance claims schema (twelve fields).
pub fn claims_v1() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        "claims_v1",
        vec![
            FieldSpec::categorical(
                "insured_sex",
                CategoryCodebook::from_pairs(&[("MALE", 0), ("FEMALE", 1)]),
            ),
            FieldSpec::categorical(
                "insured_education",
                CategoryCodebook::from_pairs(&[
                    ("High School", 0),
                    ("Associate", 1),
                    ("College", 2),
                    ("Masters", 3),
                    ("Doctorate", 4),
                ]),
            ),
            FieldSpec::categorical(
                "insured_hobbies",
                CategoryCodebook::from_pairs(&[
                    ("Reading", 0),
                    ("Sports", 1),
                    ("Music", 2),
                    ("Gaming", 3),
                    ("Art", 4),
                    ("Travel", 5),
                ]),
            ),
            FieldSpec::categorical(
                "insured_relationship",
                CategoryCodebook::from_pairs(&[
                    ("Husband", 0),
                    ("Wife", 1),
                    ("Other", 2),
                    ("Not-in-family", 3),
                ]),
            ),
            FieldSpec::categorical(
                "vehicle_price",
                CategoryCodebook::from_pairs(&[("Low", 0), ("Medium", 1), ("High", 2)]),
            ),
            FieldSpec::categorical(
                "base_policy",
                CategoryCodebook::from_pairs(&[
                    ("Liability", 0),
                    ("Collision", 1),
                    ("All Perils", 2),
                ]),
            ),
            FieldSpec::bounded_integer("policy_deductable", Some(0), None),
            FieldSpec::bounded_integer("days_policy_inception", Some(0), None),
            FieldSpec::bounded_integer("umbrella_limit", Some(0), None),
            FieldSpec::bounded_integer("capital_gains", Some(0), None)
                .with_feature_name("capital-gains"),
            // Losses are recorded either signed or unsigned upstream.
            FieldSpec::integer("capital_loss").with_feature_name("capital-loss"),
            FieldSpec::bounded_integer("incident_hour_of_the_day", Some(0), Some(23)),
        ],
    )
}

/// Vehicle insurance schema (nineteen fields).
///
/// Categorical codes are ordinal positions in the listed order.
pub fn vehicle_claims_v1() -> Result<FeatureSchema, SchemaError> {
    let yes_no = || CategoryCodebook::ordinal(&["No", "Yes"]);

    FeatureSchema::new(
        "vehicle_claims_v1",
        vec![
            FieldSpec::categorical(
                "Month",
                CategoryCodebook::ordinal(&[
                    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                    "Dec",
                ]),
            ),
            FieldSpec::bounded_integer("WeekOfMonth", Some(1), Some(5)),
            FieldSpec::categorical(
                "DayOfWeek",
                CategoryCodebook::ordinal(&[
                    "Monday",
                    "Tuesday",
                    "Wednesday",
                    "Thursday",
                    "Friday",
                    "Saturday",
                    "Sunday",
                ]),
            ),
            FieldSpec::categorical(
                "Make",
                // Spellings follow the training data.
                CategoryCodebook::ordinal(&[
                    "Accura",
                    "BMW",
                    "Chevrolet",
                    "Dodge",
                    "Ferrari",
                    "Ford",
                    "Honda",
                    "Jaguar",
                    "Lexus",
                    "Mazda",
                    "Mecedes",
                    "Mercury",
                    "Nisson",
                    "Pontiac",
                    "Porche",
                    "Saab",
                    "Saturn",
                    "Toyota",
                    "VW",
                ]),
            ),
            FieldSpec::categorical("AccidentArea", CategoryCodebook::ordinal(&["Rural", "Urban"])),
            FieldSpec::categorical("Sex", CategoryCodebook::ordinal(&["Female", "Male"])),
            FieldSpec::categorical(
                "MaritalStatus",
                CategoryCodebook::ordinal(&["Single", "Married", "Widow", "Divorced"]),
            ),
            FieldSpec::bounded_integer("Age", Some(0), Some(120)),
            FieldSpec::categorical(
                "Fault",
                CategoryCodebook::ordinal(&["Policy Holder", "Third Party"]),
            ),
            FieldSpec::categorical(
                "PolicyType",
                CategoryCodebook::ordinal(&[
                    "Sedan - All Perils",
                    "Sedan - Collision",
                    "Sedan - Liability",
                    "Sport - All Perils",
                    "Sport - Collision",
                    "Sport - Liability",
                    "Utility - All Perils",
                    "Utility - Collision",
                    "Utility - Liability",
                ]),
            ),
            FieldSpec::categorical(
                "VehicleCategory",
                CategoryCodebook::ordinal(&["Sedan", "Sport", "Utility"]),
            ),
            FieldSpec::categorical(
                "VehiclePrice",
                CategoryCodebook::ordinal(&[
                    "less than 20000",
                    "20000 to 29000",
                    "30000 to 39000",
                    "40000 to 59000",
                    "60000 to 69000",
                    "more than 69000",
                ]),
            ),
            FieldSpec::categorical(
                "PastNumberOfClaims",
                CategoryCodebook::ordinal(&["none", "1", "2 to 4", "more than 4"]),
            ),
            FieldSpec::categorical(
                "AgeOfVehicle",
                CategoryCodebook::ordinal(&[
                    "new",
                    "2 years",
                    "3 years",
                    "4 years",
                    "5 years",
                    "6 years",
                    "7 years",
                    "more than 7",
                ]),
            ),
            FieldSpec::categorical("PoliceReportFiled", yes_no()),
            FieldSpec::categorical("WitnessPresent", yes_no()),
            FieldSpec::categorical("AgentType", CategoryCodebook::ordinal(&["External", "Internal"])),
            FieldSpec::categorical(
                "NumberOfCars",
                CategoryCodebook::ordinal(&[
                    "1 vehicle",
                    "2 vehicles",
                    "3 to 4",
                    "5 to 8",
                    "more than 8",
                ]),
            ),
            FieldSpec::categorical(
                "BasePolicy",
                CategoryCodebook::ordinal(&["Liability", "Collision", "All Perils"]),
            ),
        ],
    )
}
