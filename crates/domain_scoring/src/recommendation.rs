//! Recommendation generation
//!
//! Recommendations are a deterministic lookup. Status-driven entries come
//! first, taken from a [`RecommendationCatalog`] keyed by mode and status.
//! Factor-driven entries follow: the configured recommendation text of every
//! dominant factor, in contribution order. The list is de-duplicated and
//! capped.

use std::collections::HashMap;

use crate::aggregate::dominant_factors;
use crate::decision::DecisionStatus;
use crate::evaluator::FactorResult;
use crate::product::AssessmentMode;
use crate::registry::ProductLineConfig;

/// Default share of the largest contribution a factor must exceed
pub const DEFAULT_IMPORTANCE_RATIO: f64 = 0.5;

/// Default maximum number of recommendations
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;

/// Status-driven recommendation texts
#[derive(Debug, Clone)]
pub struct RecommendationCatalog {
    entries: HashMap<(AssessmentMode, DecisionStatus), Vec<String>>,
}

impl Default for RecommendationCatalog {
    fn default() -> Self {
        use AssessmentMode::{Fraud, Risk};
        use DecisionStatus::*;

        let table: [(AssessmentMode, DecisionStatus, &[&str]); 10] = [
            (
                Risk,
                AutoApproved,
                &["Excellent risk profile", "Eligible for premium discounts"],
            ),
            (
                Risk,
                ConditionalApproval,
                &["Maintain current safety standards", "Annual risk review recommended"],
            ),
            (
                Risk,
                ManualReview,
                &[
                    "Enhanced underwriting required",
                    "Consider additional documentation",
                    "Risk mitigation plan required",
                ],
            ),
            (
                Risk,
                RequiresInvestigation,
                &["Verify applicant disclosures", "Risk mitigation plan required"],
            ),
            (
                Risk,
                Rejected,
                &[
                    "Risk exceeds underwriting appetite",
                    "Consider implementing additional safety measures",
                ],
            ),
            (
                Fraud,
                AutoApproved,
                &[
                    "Process claim normally",
                    "Standard documentation required",
                    "Routine verification sufficient",
                ],
            ),
            (
                Fraud,
                ConditionalApproval,
                &["Process claim with standard checks", "Standard documentation required"],
            ),
            (
                Fraud,
                ManualReview,
                &[
                    "Enhanced verification recommended",
                    "Request additional documentation",
                    "Consider investigator review",
                    "Verify claimant identity",
                ],
            ),
            (
                Fraud,
                RequiresInvestigation,
                &[
                    "Hold claim for investigation",
                    "Assign to fraud investigation unit",
                    "Request comprehensive documentation",
                    "Conduct field investigation",
                    "Verify all provided information",
                ],
            ),
            (
                Fraud,
                Rejected,
                &["Deny claim pending appeal", "Refer to special investigations unit"],
            ),
        ];

        let entries = table
            .into_iter()
            .map(|(mode, status, texts)| {
                let texts = texts.iter().map(|text| text.to_string()).collect();
                ((mode, status), texts)
            })
            .collect();
        Self { entries }
    }
}

impl RecommendationCatalog {
    /// Creates an empty catalog
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Replaces the entries for a mode and status
    pub fn with_entries(
        mut self,
        mode: AssessmentMode,
        status: DecisionStatus,
        texts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.entries
            .insert((mode, status), texts.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the entries for a mode and status
    pub fn entries(&self, mode: AssessmentMode, status: DecisionStatus) -> &[String] {
        self.entries
            .get(&(mode, status))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Builds the ordered recommendation list for a verdict
#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    catalog: RecommendationCatalog,
    importance_ratio: f64,
    max_entries: usize,
}

impl Default for RecommendationGenerator {
    fn default() -> Self {
        Self::new(
            RecommendationCatalog::default(),
            DEFAULT_IMPORTANCE_RATIO,
            DEFAULT_MAX_RECOMMENDATIONS,
        )
    }
}

impl RecommendationGenerator {
    pub fn new(catalog: RecommendationCatalog, importance_ratio: f64, max_entries: usize) -> Self {
        Self {
            catalog,
            importance_ratio,
            max_entries,
        }
    }

    /// Generates recommendations
    ///
    /// `factors` must be sorted by contribution, as returned by
    /// [`crate::aggregate::aggregate`]. Factor texts come from `config`.
    pub fn generate(
        &self,
        mode: AssessmentMode,
        status: DecisionStatus,
        factors: &[FactorResult],
        config: &ProductLineConfig,
    ) -> Vec<String> {
        let status_entries = self.catalog.entries(mode, status).iter().map(String::as_str);
        let factor_entries = dominant_factors(factors, self.importance_ratio)
            .filter_map(|result| config.factor(&result.name))
            .filter_map(|spec| spec.recommendation.as_deref());

        let mut recommendations: Vec<String> = Vec::new();
        for text in status_entries.chain(factor_entries) {
            if recommendations.len() >= self.max_entries {
                break;
            }
            if !recommendations.iter().any(|existing| existing == text) {
                recommendations.push(text.to_string());
            }
        }
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_status() {
        let catalog = RecommendationCatalog::default();
        for mode in [AssessmentMode::Risk, AssessmentMode::Fraud] {
            for status in [
                DecisionStatus::AutoApproved,
                DecisionStatus::ConditionalApproval,
                DecisionStatus::ManualReview,
                DecisionStatus::RequiresInvestigation,
                DecisionStatus::Rejected,
            ] {
                assert!(!catalog.entries(mode, status).is_empty(), "{mode} {status}");
            }
        }
    }

    #[test]
    fn test_catalog_texts() {
        let catalog = RecommendationCatalog::default();
        assert_eq!(
            catalog.entries(AssessmentMode::Risk, DecisionStatus::AutoApproved)[0],
            "Excellent risk profile"
        );
        assert_eq!(
            catalog.entries(AssessmentMode::Fraud, DecisionStatus::RequiresInvestigation)[0],
            "Hold claim for investigation"
        );
    }

    #[test]
    fn test_custom_entries() {
        let catalog = RecommendationCatalog::empty().with_entries(
            AssessmentMode::Risk,
            DecisionStatus::Rejected,
            ["Decline"],
        );
        assert_eq!(catalog.entries(AssessmentMode::Risk, DecisionStatus::Rejected), ["Decline"]);
        assert!(catalog
            .entries(AssessmentMode::Risk, DecisionStatus::AutoApproved)
            .is_empty());
    }
}
