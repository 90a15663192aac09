//! Proptest strategies
//!
//! Provides proptest strategies for generating subjects. Subject
//! strategies may omit any field, so properties also cover the neutral
//! default path.

use proptest::prelude::*;
use serde_json::{Map, Value};

fn insert_some(fields: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), value);
    }
}

/// Strategy for AUTO applications with any subset of fields present
pub fn auto_subject_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(16u32..100),
        proptest::option::of(proptest::sample::subsequence(
            vec!["speeding", "dui", "reckless_driving", "parking"],
            0..=4,
        )),
        proptest::option::of(proptest::sample::select(vec![
            "sedan",
            "suv",
            "sports_car",
            "motorcycle",
            "minivan",
            "boat",
        ])),
        proptest::option::of(0u32..60_000),
        proptest::option::of(1_000u64..400_000),
    )
        .prop_map(|(age, violations, vehicle, mileage, coverage)| {
            let mut fields = Map::new();
            insert_some(&mut fields, "age", age.map(Value::from));
            insert_some(
                &mut fields,
                "drivingViolations",
                violations.map(Value::from),
            );
            insert_some(&mut fields, "vehicleType", vehicle.map(Value::from));
            insert_some(&mut fields, "annualMileage", mileage.map(Value::from));
            insert_some(&mut fields, "coverageAmount", coverage.map(Value::from));
            Value::Object(fields)
        })
}

/// Strategy for claims with any subset of fields present
pub fn claim_subject_strategy() -> impl Strategy<Value = Value> {
    (
        proptest::option::of(proptest::sample::subsequence(
            vec![
                "total loss",
                "no witnesses",
                "brand new",
                "same day",
                "exactly $2000.00",
                "minor scratch",
            ],
            0..=6,
        )),
        proptest::option::of(1u64..250_000),
        proptest::option::of(0u32..12),
        proptest::option::of(1_000u64..300_000),
        proptest::option::of(0usize..3),
    )
        .prop_map(|(phrases, amount, previous, limit, witnesses)| {
            let mut fields = Map::new();
            insert_some(
                &mut fields,
                "description",
                phrases.map(|parts| Value::from(parts.join(", "))),
            );
            insert_some(&mut fields, "amount", amount.map(Value::from));
            if let Some(previous) = previous {
                let mut claimant = Map::new();
                claimant.insert("previousClaims".to_string(), Value::from(previous));
                fields.insert("claimant".to_string(), Value::Object(claimant));
            }
            insert_some(&mut fields, "policyLimit", limit.map(Value::from));
            if let Some(count) = witnesses {
                let names: Vec<Value> = (0..count)
                    .map(|i| Value::from(format!("witness-{i}")))
                    .collect();
                let mut incident = Map::new();
                incident.insert("witnesses".to_string(), Value::Array(names));
                fields.insert("incident".to_string(), Value::Object(incident));
            }
            Value::Object(fields)
        })
}
