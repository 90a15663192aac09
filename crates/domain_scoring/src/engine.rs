//! Assessment engine
//!
//! [`RiskEngine`] runs the single-subject pipeline:
//!
//! 1. resolve the product line configuration (fallback to `GENERAL`)
//! 2. evaluate every factor against the subject
//! 3. aggregate into a composite score and sort by contribution
//! 4. classify into a risk tier
//! 5. resolve the decision and monetary adjustment
//! 6. generate recommendations
//!
//! The engine holds only immutable state, so one instance can serve any
//! number of concurrent callers.

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use core_kernel::Score;

use crate::aggregate::aggregate;
use crate::classifier::RiskTier;
use crate::decision::{DecisionStatus, MonetaryAdjustment};
use crate::error::{AssessmentError, ConfigurationError, EvaluationError};
use crate::evaluator::{evaluate, FactorResult};
use crate::product::{AssessmentMode, ProductLine};
use crate::recommendation::{
    RecommendationCatalog, RecommendationGenerator, DEFAULT_IMPORTANCE_RATIO,
    DEFAULT_MAX_RECOMMENDATIONS,
};
use crate::registry::{FactorRegistry, ProductLineConfig};
use crate::subject::SubjectRecord;

/// Tunables for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Worker threads used by batch assessment
    pub max_concurrency: usize,
    /// Share of the largest contribution a factor must exceed to add its
    /// recommendation
    pub importance_ratio: f64,
    /// Maximum number of recommendations per verdict
    pub max_recommendations: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            importance_ratio: DEFAULT_IMPORTANCE_RATIO,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_concurrency == 0 {
            return Err(ConfigurationError::InvalidSettings(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if !Score::is_unit(self.importance_ratio) {
            return Err(ConfigurationError::InvalidSettings(format!(
                "importance_ratio {} is outside [0, 1]",
                self.importance_ratio
            )));
        }
        Ok(())
    }
}

/// The structured result of one assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeVerdict {
    /// Identifier carried by the subject, if any
    pub subject_id: Option<String>,
    /// Product line as requested by the caller
    pub product_line: ProductLine,
    pub mode: AssessmentMode,
    /// Version of the factor table that produced the verdict
    pub config_version: String,
    pub composite_score: Score,
    pub tier: RiskTier,
    /// Factor results, largest contribution first
    pub factors: Vec<FactorResult>,
    pub status: DecisionStatus,
    /// True when the amount override raised the status
    pub escalated: bool,
    pub adjustment: MonetaryAdjustment,
    pub recommendations: Vec<String>,
}

/// Multi-factor scoring engine
#[derive(Debug, Clone)]
pub struct RiskEngine {
    registry: Arc<FactorRegistry>,
    recommender: RecommendationGenerator,
    pub(crate) pool: Arc<ThreadPool>,
    settings: EngineSettings,
}

impl RiskEngine {
    /// Creates an engine over a loaded registry
    pub fn new(
        registry: Arc<FactorRegistry>,
        settings: EngineSettings,
    ) -> Result<Self, ConfigurationError> {
        Self::with_catalog(registry, settings, RecommendationCatalog::default())
    }

    /// Creates an engine with a custom recommendation catalog
    pub fn with_catalog(
        registry: Arc<FactorRegistry>,
        settings: EngineSettings,
        catalog: RecommendationCatalog,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.max_concurrency)
            .thread_name(|index| format!("scoring-worker-{index}"))
            .build()
            .map_err(|e| ConfigurationError::WorkerPool(e.to_string()))?;
        let recommender = RecommendationGenerator::new(
            catalog,
            settings.importance_ratio,
            settings.max_recommendations,
        );
        Ok(Self {
            registry,
            recommender,
            pool: Arc::new(pool),
            settings,
        })
    }

    /// Creates an engine over the built-in factor table with default settings
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::new(Arc::new(FactorRegistry::builtin()?), EngineSettings::default())
    }

    pub fn registry(&self) -> &FactorRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Assesses one subject
    ///
    /// Absent fields never fail; they score neutrally. Errors are returned
    /// for an unknown product line and for fields of the wrong type.
    pub fn assess(
        &self,
        product_line: &str,
        subject: &Value,
        mode: AssessmentMode,
    ) -> Result<CompositeVerdict, AssessmentError> {
        let requested: ProductLine = product_line.parse()?;
        let config = self.registry.get(requested, mode)?;
        Ok(self.assess_with(requested, &config, subject)?)
    }

    /// Runs the pipeline against an already resolved configuration
    pub(crate) fn assess_with(
        &self,
        requested: ProductLine,
        config: &ProductLineConfig,
        subject: &Value,
    ) -> Result<CompositeVerdict, EvaluationError> {
        let record = SubjectRecord::from_value(subject)?;

        let results = config
            .factors()
            .iter()
            .map(|spec| evaluate(&record, spec))
            .collect::<Result<Vec<_>, _>>()?;
        let aggregate = aggregate(results);

        let tier = config.tiers().classify(aggregate.composite);
        let decision = config
            .decision()
            .resolve(aggregate.composite, &record, config.currency())?;
        let recommendations =
            self.recommender
                .generate(config.mode(), decision.status, &aggregate.factors, config);

        let verdict = CompositeVerdict {
            subject_id: record.subject_id(),
            product_line: requested,
            mode: config.mode(),
            config_version: self.registry.version().to_string(),
            composite_score: aggregate.composite,
            tier,
            factors: aggregate.factors,
            status: decision.status,
            escalated: decision.escalated,
            adjustment: decision.adjustment,
            recommendations,
        };

        debug!(
            subject_id = ?verdict.subject_id,
            product_line = %verdict.product_line,
            mode = %verdict.mode,
            score = verdict.composite_score.value(),
            tier = %verdict.tier,
            status = %verdict.status,
            "Assessment complete"
        );

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> RiskEngine {
        RiskEngine::new(
            Arc::new(FactorRegistry::builtin().unwrap()),
            EngineSettings {
                max_concurrency: 2,
                ..EngineSettings::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_settings_validation() {
        let zero = EngineSettings {
            max_concurrency: 0,
            ..EngineSettings::default()
        };
        assert!(zero.validate().is_err());

        let ratio = EngineSettings {
            importance_ratio: 1.5,
            ..EngineSettings::default()
        };
        assert!(matches!(
            ratio.validate(),
            Err(ConfigurationError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert!(settings.max_concurrency >= 1);
        assert_eq!(settings.max_recommendations, 5);
    }

    #[test]
    fn test_requested_product_line_is_reported() {
        let verdict = engine()
            .assess("home", &json!({ "claimId": "C-7" }), AssessmentMode::Fraud)
            .unwrap();
        assert_eq!(verdict.product_line, ProductLine::Home);
        assert_eq!(verdict.mode, AssessmentMode::Fraud);
        assert_eq!(verdict.subject_id.as_deref(), Some("C-7"));
        assert_eq!(verdict.config_version, "2024.06");
    }

    #[test]
    fn test_non_object_subject() {
        let result = engine().assess("AUTO", &json!("not a record"), AssessmentMode::Risk);
        assert!(matches!(
            result,
            Err(AssessmentError::Evaluation(EvaluationError::NotAnObject("string")))
        ));
    }

    #[test]
    fn test_unknown_product_line() {
        let result = engine().assess("MARINE", &json!({}), AssessmentMode::Risk);
        assert!(matches!(result, Err(AssessmentError::Configuration(_))));
    }
}
