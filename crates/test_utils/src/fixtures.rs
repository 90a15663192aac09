//! Canned subjects and amounts
//!
//! Provides ready-to-use subjects for the built-in factor table. Expected
//! scores noted on each fixture assume the table shipped with
//! `domain_scoring` (version 2024.06).

use core_kernel::{Currency, Money};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Canned subject records
pub struct SubjectFixtures;

impl SubjectFixtures {
    /// Subject with no fields at all
    pub fn empty() -> Value {
        json!({})
    }

    /// Young driver with a repeated speeding violation
    ///
    /// AUTO risk composite 0.47: MEDIUM tier, conditional approval.
    pub fn young_auto_driver() -> Value {
        json!({
            "applicationId": "APP-AUTO-001",
            "age": 22,
            "drivingViolations": ["speeding", "speeding"],
            "coverageAmount": 10000
        })
    }

    /// Middle-aged driver with a clean record and a family car
    pub fn careful_auto_driver() -> Value {
        json!({
            "applicationId": "APP-AUTO-002",
            "age": 45,
            "drivingViolations": [],
            "vehicleType": "minivan",
            "location": "rural",
            "annualMileage": 8000,
            "coverageAmount": 30000
        })
    }

    /// Driver whose every factor signals high risk
    pub fn reckless_auto_driver() -> Value {
        json!({
            "applicationId": "APP-AUTO-003",
            "age": 19,
            "drivingViolations": ["speeding", "DUI", "reckless_driving"],
            "vehicleType": "Sports Car",
            "location": "urban, high_crime",
            "annualMileage": 30000,
            "coverageAmount": 80000
        })
    }

    /// Low-risk driver asking for coverage above the AUTO ceiling
    pub fn high_value_auto_policy() -> Value {
        json!({
            "applicationId": "APP-AUTO-004",
            "age": 40,
            "vehicleType": "sedan",
            "annualMileage": 6000,
            "coverageAmount": 250000
        })
    }

    /// Claim narrative with two indicators and an exact round amount
    ///
    /// GENERAL fraud composite 0.665: MEDIUM tier, manual review.
    pub fn suspicious_claim() -> Value {
        json!({
            "claimId": "CLM-001",
            "description": "total loss, no witnesses, exactly $5000.00",
            "amount": 5000
        })
    }

    /// Routine claim with an irregular amount and a normal filing delay
    pub fn routine_claim() -> Value {
        json!({
            "claimId": "CLM-002",
            "description": "Rear bumper dented in a parking lot, repair invoice attached",
            "amount": 1234.56,
            "incidentDate": "2024-03-01",
            "claimDate": "2024-03-04",
            "claimant": { "previousClaims": 0 }
        })
    }

    /// Claim stacking every fraud signal
    pub fn staged_claim() -> Value {
        json!({
            "claimId": "CLM-003",
            "description": "Staged looking total loss, brand new car stolen immediately, \
                            no witnesses, cash only, exactly $9,000.00 which is the policy limit",
            "amount": 9000,
            "incidentDate": "2024-05-10",
            "claimDate": "2024-05-10",
            "claimant": { "previousClaims": 6 }
        })
    }

    /// Claim for an amount above the fraud escalation ceiling
    pub fn large_claim() -> Value {
        json!({
            "claimId": "CLM-004",
            "description": "Warehouse fire damage",
            "amount": 150000.55
        })
    }

    /// Subject whose age has the wrong type
    pub fn malformed_age() -> Value {
        json!({ "applicationId": "APP-BAD", "age": "old" })
    }
}

/// Expected amounts for the canned subjects
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Settlement for [`SubjectFixtures::suspicious_claim`] after the
    /// default 25% penalty
    pub fn usd_penalised_settlement() -> Money {
        Money::new(dec!(3750.00), Currency::USD)
    }
}
