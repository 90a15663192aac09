//! Tests for factor table loading and validation

use serde_json::{json, Value};

use domain_scoring::classifier::RiskTier;
use domain_scoring::decision::DecisionStatus;
use domain_scoring::error::ConfigurationError;
use domain_scoring::factor::Rule;
use domain_scoring::product::{AssessmentMode, ProductLine};
use domain_scoring::registry::{FactorRegistry, BUILTIN_FACTOR_TABLE};

use core_kernel::{Currency, Score};

fn table(entries: Value) -> String {
    json!({ "version": "test-1", "product_lines": entries }).to_string()
}

fn threshold_factor(name: &str) -> Value {
    json!({
        "name": name,
        "weight": 0.5,
        "rule": { "kind": "threshold", "field": "age", "cutoff": 80 }
    })
}

fn load(entries: Value) -> Result<FactorRegistry, ConfigurationError> {
    FactorRegistry::from_json_str(&table(entries))
}

// ============================================================================
// Built-in Table Tests
// ============================================================================

mod builtin_tests {
    use super::*;

    #[test]
    fn test_builtin_entries() {
        let registry = FactorRegistry::builtin().unwrap();

        for line in ProductLine::ALL {
            assert!(registry.has_entry(line, AssessmentMode::Risk), "{line}");
        }
        assert!(registry.has_entry(ProductLine::General, AssessmentMode::Fraud));
    }

    #[test]
    fn test_builtin_fraud_baseline_below_review() {
        let registry = FactorRegistry::builtin().unwrap();
        let fraud = registry.get(ProductLine::General, AssessmentMode::Fraud).unwrap();

        let neutral: f64 = fraud
            .factors()
            .iter()
            .map(|factor| factor.neutral.weighted(factor.weight))
            .sum();
        assert!(neutral < 0.4, "neutral baseline {neutral}");
    }

    #[test]
    fn test_builtin_keywords_are_lower_case() {
        let registry = FactorRegistry::builtin().unwrap();
        let fraud = registry.get(ProductLine::General, AssessmentMode::Fraud).unwrap();

        let Some(Rule::KeywordSet(rule)) = fraud.factor("suspicious_language").map(|f| &f.rule) else {
            panic!("suspicious_language should be a keyword rule");
        };
        assert!(rule.keywords.iter().all(|k| *k == k.to_lowercase()));
    }

    #[test]
    fn test_builtin_decision_settings() {
        let registry = FactorRegistry::builtin().unwrap();
        let auto = registry.get(ProductLine::Auto, AssessmentMode::Risk).unwrap();

        assert_eq!(auto.currency(), Currency::USD);
        assert_eq!(auto.decision().amount_field(), Some("coverageAmount"));
        assert_eq!(auto.tiers().classify(Score::new(0.75)), RiskTier::High);
    }

    #[test]
    fn test_builtin_table_is_valid_json() {
        let value: Value = serde_json::from_str(BUILTIN_FACTOR_TABLE).unwrap();
        assert_eq!(value["version"], "2024.06");
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_minimal_table_loads() {
        let registry = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "factors": [threshold_factor("age")]
        }]))
        .unwrap();

        assert_eq!(registry.version(), "test-1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_factor_rejected() {
        let result = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "factors": [threshold_factor("age"), threshold_factor("age")]
        }]));

        assert!(matches!(
            result,
            Err(ConfigurationError::DuplicateFactor { factor, .. }) if factor == "age"
        ));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let entry = json!({
            "product_line": "HOME",
            "mode": "risk",
            "factors": [threshold_factor("age")]
        });
        let result = load(json!([entry.clone(), entry]));

        assert!(matches!(result, Err(ConfigurationError::DuplicateEntry { .. })));
    }

    #[test]
    fn test_same_line_in_both_modes_is_allowed() {
        let registry = load(json!([
            { "product_line": "HOME", "mode": "risk", "factors": [threshold_factor("age")] },
            { "product_line": "HOME", "mode": "fraud", "factors": [threshold_factor("age")] }
        ]))
        .unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_one_bad_entry_rejects_whole_table() {
        let result = load(json!([
            { "product_line": "AUTO", "mode": "risk", "factors": [threshold_factor("age")] },
            {
                "product_line": "HOME",
                "mode": "risk",
                "factors": [{
                    "name": "broken",
                    "weight": "heavy",
                    "rule": { "kind": "threshold", "field": "age", "cutoff": 80 }
                }]
            }
        ]));

        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn test_unknown_rule_kind_rejected_at_load() {
        let result = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "factors": [{
                "name": "oracle",
                "weight": 0.5,
                "rule": { "kind": "crystal_ball", "field": "age" }
            }]
        }]));

        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn test_empty_keyword_list_rejected() {
        let result = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "factors": [{
                "name": "history",
                "weight": 0.5,
                "rule": { "kind": "keyword_set", "field": "notes", "keywords": [], "per_match": 0.3 }
            }]
        }]));

        assert!(matches!(result, Err(ConfigurationError::InvalidFactor { .. })));
    }

    #[test]
    fn test_entry_without_factors_rejected() {
        let result = load(json!([{ "product_line": "AUTO", "mode": "risk", "factors": [] }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overlapping_tiers_rejected() {
        let result = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "tiers": [
                { "label": "MEDIUM", "lower": 0.4 },
                { "label": "HIGH", "lower": 0.4 },
                { "label": "LOW", "lower": 0.0 }
            ],
            "factors": [threshold_factor("age")]
        }]));

        assert!(matches!(result, Err(ConfigurationError::InvalidBands(_))));
    }

    #[test]
    fn test_custom_bands() {
        let registry = load(json!([{
            "product_line": "AUTO",
            "mode": "fraud",
            "tiers": [
                { "label": "HIGH", "lower": 0.5 },
                { "label": "LOW", "lower": 0.0 }
            ],
            "decision": {
                "bands": [
                    { "label": "REJECTED", "lower": 0.9 },
                    { "label": "REQUIRES_INVESTIGATION", "lower": 0.5, "inclusive": false },
                    { "label": "AUTO_APPROVED", "lower": 0.0 }
                ]
            },
            "factors": [threshold_factor("age")]
        }]))
        .unwrap();

        let config = registry.get(ProductLine::Auto, AssessmentMode::Fraud).unwrap();
        assert_eq!(config.tiers().classify(Score::new(0.5)), RiskTier::High);
        assert_eq!(config.tiers().bands().len(), 2);

        let subject = json!({});
        let record = domain_scoring::SubjectRecord::from_value(&subject).unwrap();
        let decision = config
            .decision()
            .resolve(Score::new(0.5), &record, Currency::USD)
            .unwrap();
        assert_eq!(decision.status, DecisionStatus::AutoApproved);
    }

    #[test]
    fn test_ceiling_without_amount_field_rejected() {
        let result = load(json!([{
            "product_line": "AUTO",
            "mode": "risk",
            "decision": { "escalation_ceiling": 1000 },
            "factors": [threshold_factor("age")]
        }]));

        assert!(matches!(result, Err(ConfigurationError::InvalidPolicy(_))));
    }

    #[test]
    fn test_unknown_product_line_key_rejected() {
        let result = load(json!([{
            "product_line": "MARINE",
            "mode": "risk",
            "factors": [threshold_factor("age")]
        }]));

        assert!(matches!(result, Err(ConfigurationError::Parse(_))));
    }

    #[test]
    fn test_blank_version_rejected() {
        let result = FactorRegistry::from_json_str(r#"{ "version": " ", "product_lines": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = FactorRegistry::from_file("/nonexistent/factor_table.json");
        assert!(matches!(result, Err(ConfigurationError::Io { .. })));
    }
}
