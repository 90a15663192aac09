//! Factor configuration registry
//!
//! The registry holds one immutable [`ProductLineConfig`] per product line
//! and assessment mode. It is loaded once, validated as a whole, and then
//! shared read-only behind `Arc` by every assessment. A table that fails any
//! check is rejected entirely; nothing is partially applied.
//!
//! # Table layout
//!
//! ```json
//! {
//!   "version": "2024.06",
//!   "product_lines": [
//!     {
//!       "product_line": "AUTO",
//!       "mode": "risk",
//!       "currency": "USD",
//!       "tiers": [{ "label": "HIGH", "lower": 0.7 }, ...],
//!       "decision": { "amount_field": "coverageAmount", "escalation_ceiling": 100000 },
//!       "factors": [{ "name": "age_factor", "weight": 0.2, "rule": { "kind": "threshold", ... } }]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use core_kernel::Currency;

use crate::classifier::{Band, Bands, RiskTier};
use crate::decision::{DecisionDefinition, DecisionPolicy};
use crate::error::ConfigurationError;
use crate::factor::{FactorDefinition, FactorSpec};
use crate::product::{AssessmentMode, ProductLine};

/// The factor table shipped with the crate
pub const BUILTIN_FACTOR_TABLE: &str = include_str!("../config/product_lines.json");

/// Factor table as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorTableDefinition {
    pub version: String,
    pub product_lines: Vec<ProductLineDefinition>,
}

/// One product line entry as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductLineDefinition {
    pub product_line: ProductLine,
    pub mode: AssessmentMode,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub tiers: Option<Vec<Band<RiskTier>>>,
    #[serde(default)]
    pub decision: DecisionDefinition,
    pub factors: Vec<FactorDefinition>,
}

/// Validated configuration for one product line and mode
#[derive(Debug, Clone)]
pub struct ProductLineConfig {
    product_line: ProductLine,
    mode: AssessmentMode,
    currency: Currency,
    tiers: Bands<RiskTier>,
    decision: DecisionPolicy,
    factors: Vec<FactorSpec>,
}

impl ProductLineConfig {
    /// Validates an entry and compiles its factors
    pub fn compile(definition: ProductLineDefinition) -> Result<Self, ConfigurationError> {
        let ProductLineDefinition {
            product_line,
            mode,
            currency,
            tiers,
            decision,
            factors,
        } = definition;

        if factors.is_empty() {
            return Err(ConfigurationError::invalid_policy(format!(
                "{product_line} {mode} configuration has no factors"
            )));
        }

        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(factors.len());
        for factor in factors {
            if !seen.insert(factor.name.clone()) {
                return Err(ConfigurationError::DuplicateFactor {
                    product_line: product_line.to_string(),
                    factor: factor.name,
                });
            }
            compiled.push(FactorSpec::compile(factor)?);
        }

        Ok(Self {
            product_line,
            mode,
            currency,
            tiers: Bands::new(tiers.unwrap_or_else(RiskTier::default_bands))?,
            decision: DecisionPolicy::compile(decision, mode)?,
            factors: compiled,
        })
    }

    pub fn product_line(&self) -> ProductLine {
        self.product_line
    }

    pub fn mode(&self) -> AssessmentMode {
        self.mode
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn tiers(&self) -> &Bands<RiskTier> {
        &self.tiers
    }

    pub fn decision(&self) -> &DecisionPolicy {
        &self.decision
    }

    /// Factors in configuration order
    pub fn factors(&self) -> &[FactorSpec] {
        &self.factors
    }

    /// Looks up a factor by name
    pub fn factor(&self, name: &str) -> Option<&FactorSpec> {
        self.factors.iter().find(|factor| factor.name == name)
    }

    /// Sum of factor weights, which need not be one
    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|factor| factor.weight).sum()
    }
}

/// Immutable registry of product line configurations
#[derive(Debug, Clone)]
pub struct FactorRegistry {
    version: String,
    entries: HashMap<(ProductLine, AssessmentMode), Arc<ProductLineConfig>>,
}

impl FactorRegistry {
    /// Loads the built-in factor table
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUILTIN_FACTOR_TABLE)
    }

    /// Loads a factor table from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let definition: FactorTableDefinition = serde_json::from_str(json)?;
        Self::from_definition(definition)
    }

    /// Loads a factor table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Validates every entry, failing on the first defect
    pub fn from_definition(definition: FactorTableDefinition) -> Result<Self, ConfigurationError> {
        let FactorTableDefinition {
            version,
            product_lines,
        } = definition;

        if version.trim().is_empty() {
            return Err(ConfigurationError::invalid_policy(
                "factor table version must not be blank",
            ));
        }

        let mut entries = HashMap::with_capacity(product_lines.len());
        for entry in product_lines {
            let key = (entry.product_line, entry.mode);
            if entries.contains_key(&key) {
                return Err(ConfigurationError::DuplicateEntry {
                    product_line: key.0.to_string(),
                    mode: key.1.to_string(),
                });
            }
            let config = ProductLineConfig::compile(entry)?;
            entries.insert(key, Arc::new(config));
        }

        info!(
            version = %version,
            entries = entries.len(),
            "Factor registry loaded"
        );

        Ok(Self { version, entries })
    }

    /// Version string of the loaded table
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of product line entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configuration for a product line and mode
    ///
    /// Falls back to the `GENERAL` entry of the same mode when the product
    /// line has no entry of its own.
    pub fn get(
        &self,
        product_line: ProductLine,
        mode: AssessmentMode,
    ) -> Result<Arc<ProductLineConfig>, ConfigurationError> {
        self.entries
            .get(&(product_line, mode))
            .or_else(|| self.entries.get(&(ProductLine::General, mode)))
            .cloned()
            .ok_or_else(|| ConfigurationError::MissingProductLine {
                product_line: product_line.to_string(),
                mode: mode.to_string(),
            })
    }

    /// Parses a product line key and returns its configuration
    pub fn resolve(
        &self,
        product_line: &str,
        mode: AssessmentMode,
    ) -> Result<Arc<ProductLineConfig>, ConfigurationError> {
        self.get(product_line.parse()?, mode)
    }

    /// Returns true when the pair has its own entry, without fallback
    pub fn has_entry(&self, product_line: ProductLine, mode: AssessmentMode) -> bool {
        self.entries.contains_key(&(product_line, mode))
    }
}
