//! Unit-interval scores
//!
//! Every factor score and composite score in the system lives in `[0, 1]`.
//! `Score` enforces that at construction so downstream code never has to
//! re-check the bound.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::CoreError;

/// A score clamped to the closed interval `[0, 1]`
///
/// NaN inputs collapse to zero, which makes the type totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// The lowest possible score
    pub const ZERO: Score = Score(0.0);

    /// The highest possible score
    pub const ONE: Score = Score(1.0);

    /// Creates a score, clamping the value into `[0, 1]`
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        // `+ 0.0` folds negative zero into positive zero for `Ord`
        Self(value.clamp(0.0, 1.0) + 0.0)
    }

    /// Creates a score from a value that must already lie in `[0, 1]`
    ///
    /// Used when validating configured scores, where silent clamping would
    /// hide a typo in the factor table.
    pub fn try_new(value: f64) -> Result<Self, CoreError> {
        if Self::is_unit(value) {
            Ok(Self(value + 0.0))
        } else {
            Err(CoreError::ScoreOutOfRange(value))
        }
    }

    /// Returns the raw value
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns `score * weight`
    ///
    /// The product is not clamped: weights may exceed one.
    pub fn weighted(&self, weight: f64) -> f64 {
        self.0 * weight
    }

    /// Returns true if the value lies in `[0, 1]`
    ///
    /// Useful for validating configuration values before they become scores.
    pub fn is_unit(value: f64) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Score::new)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn score_always_in_unit_interval(value in proptest::num::f64::ANY) {
            let score = Score::new(value);
            prop_assert!(Score::is_unit(score.value()));
        }

        #[test]
        fn score_construction_is_monotonic(a in -2.0f64..2.0, b in -2.0f64..2.0) {
            prop_assume!(a <= b);
            prop_assert!(Score::new(a) <= Score::new(b));
        }
    }
}
