//! Assertions for scores, orderings and amounts
//!
//! Each helper names the offending values in its panic message.

use core_kernel::{Money, Score};
use rust_decimal::Decimal;

/// Default tolerance for floating-point score comparisons
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// Asserts that a value lies in `[0, 1]`
pub fn assert_unit_interval(value: f64, what: &str) {
    assert!(
        Score::is_unit(value),
        "{what} = {value} is outside [0, 1]"
    );
}

/// Asserts that two floats are equal within [`SCORE_TOLERANCE`]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= SCORE_TOLERANCE,
        "Values differ: actual={actual}, expected={expected}"
    );
}

/// Asserts that values never increase
pub fn assert_descending(values: &[f64]) {
    for (index, pair) in values.windows(2).enumerate() {
        assert!(
            pair[0] >= pair[1],
            "Values not descending at position {}: {} < {}",
            index + 1,
            pair[0],
            pair[1]
        );
    }
}

/// Asserts two amounts share a currency and differ by at most `tolerance`
pub fn assert_money_within(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "currencies differ: {actual} vs {expected}"
    );
    let gap = (actual.amount() - expected.amount()).abs();
    assert!(
        gap <= tolerance,
        "{actual} is {gap} away from {expected} (tolerance {tolerance})"
    );
}
