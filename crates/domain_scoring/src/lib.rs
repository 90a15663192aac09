//! Scoring Domain - Multi-factor risk and fraud assessment
//!
//! This crate is the decision core used by underwriting and claims
//! processing. Given a policy application or a claim it produces:
//! - a composite score in `[0, 1]` built from weighted, explainable factors
//! - a risk tier (LOW / MEDIUM / HIGH)
//! - a decision status, with amount-based escalation
//! - a premium loading or settlement estimate
//! - an ordered list of recommendations
//!
//! Behaviour differs by product line and mode only through configuration:
//! a versioned factor table loaded once into a [`FactorRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use domain_scoring::{AssessmentMode, RiskEngine};
//! use serde_json::json;
//!
//! let engine = RiskEngine::builtin()?;
//! let verdict = engine.assess(
//!     "AUTO",
//!     &json!({ "age": 22, "drivingViolations": ["speeding"] }),
//!     AssessmentMode::Risk,
//! )?;
//! println!("{} {}", verdict.composite_score, verdict.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod batch;
pub mod classifier;
pub mod decision;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod factor;
pub mod product;
pub mod recommendation;
pub mod registry;
pub mod subject;

pub use aggregate::{aggregate, Aggregate};
pub use batch::{BatchOutcome, BatchSummary};
pub use classifier::{Band, Bands, RiskTier};
pub use decision::{Decision, DecisionPolicy, DecisionStatus, MonetaryAdjustment};
pub use engine::{CompositeVerdict, EngineSettings, RiskEngine};
pub use error::{AssessmentError, ConfigurationError, EvaluationError, ItemError};
pub use evaluator::{evaluate, FactorResult};
pub use factor::{FactorSpec, Rule, DEFAULT_NEUTRAL_SCORE};
pub use product::{AssessmentMode, ProductLine};
pub use recommendation::{RecommendationCatalog, RecommendationGenerator};
pub use registry::{FactorRegistry, ProductLineConfig, BUILTIN_FACTOR_TABLE};
pub use subject::SubjectRecord;
