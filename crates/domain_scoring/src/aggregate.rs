//! Weighted aggregation of factor results

use core_kernel::Score;

use crate::evaluator::FactorResult;

/// Decimal places kept in the composite before classification
pub const COMPOSITE_PRECISION: i32 = 9;

/// Composite score with the factor results that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// `clamp(Σ score·weight, 0, 1)`
    pub composite: Score,
    /// Factor results, largest contribution first
    pub factors: Vec<FactorResult>,
}

/// Combines factor results into a composite score
///
/// Weights are used as configured and are not renormalised. The sum is
/// taken in configuration order before sorting so the result does not depend
/// on how ties are broken. The sort is stable: equal contributions keep their
/// configuration order.
///
/// The total is rounded to [`COMPOSITE_PRECISION`] places so that sums which
/// are exact in decimal, such as `0.4`, land on their band boundary.
pub fn aggregate(mut factors: Vec<FactorResult>) -> Aggregate {
    let total: f64 = factors.iter().map(|factor| factor.contribution).sum();
    factors.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    Aggregate {
        composite: Score::new(round_composite(total)),
        factors,
    }
}

fn round_composite(total: f64) -> f64 {
    let scale = 10_f64.powi(COMPOSITE_PRECISION);
    (total * scale).round() / scale
}

impl Aggregate {
    /// Largest single contribution, zero when there are no factors
    pub fn max_contribution(&self) -> f64 {
        self.factors
            .first()
            .map_or(0.0, |factor| factor.contribution.max(0.0))
    }

    /// Factors whose contribution is positive and exceeds `ratio` times the
    /// largest contribution, in contribution order
    pub fn dominant(&self, ratio: f64) -> impl Iterator<Item = &FactorResult> {
        dominant_factors(&self.factors, ratio)
    }
}

/// Filters factor results, assumed sorted by contribution, to the dominant ones
pub fn dominant_factors(factors: &[FactorResult], ratio: f64) -> impl Iterator<Item = &FactorResult> {
    let max = factors
        .iter()
        .map(|factor| factor.contribution)
        .fold(0.0_f64, f64::max);
    let threshold = ratio * max;
    factors
        .iter()
        .filter(move |factor| factor.contribution > 0.0 && factor.contribution > threshold)
}
