//! Decision resolution
//!
//! One parametrised resolver serves both assessment modes. A
//! [`DecisionPolicy`] is built per product line entry and carries:
//!
//! - the score bands mapping a composite score to a [`DecisionStatus`]
//! - an optional amount field and ceiling; an amount strictly above the
//!   ceiling forces at least `MANUAL_REVIEW`
//! - the monetary adjustment: a premium loading in risk mode, a settlement
//!   estimate in fraud mode
//!
//! Overrides apply after banding and only ever escalate.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{CoreError, Currency, Money, Rate, Score};

use crate::classifier::{Band, Bands};
use crate::error::{ConfigurationError, EvaluationError};
use crate::product::AssessmentMode;
use crate::subject::SubjectRecord;

/// Actionable outcome, ordered from least to most restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    AutoApproved,
    ConditionalApproval,
    ManualReview,
    RequiresInvestigation,
    Rejected,
}

impl DecisionStatus {
    /// Returns the configuration key
    pub fn code(&self) -> &'static str {
        match self {
            DecisionStatus::AutoApproved => "AUTO_APPROVED",
            DecisionStatus::ConditionalApproval => "CONDITIONAL_APPROVAL",
            DecisionStatus::ManualReview => "MANUAL_REVIEW",
            DecisionStatus::RequiresInvestigation => "REQUIRES_INVESTIGATION",
            DecisionStatus::Rejected => "REJECTED",
        }
    }

    /// Returns true when no settlement may be quoted in this state
    pub fn blocks_settlement(&self) -> bool {
        matches!(
            self,
            DecisionStatus::RequiresInvestigation | DecisionStatus::Rejected
        )
    }

    /// Default underwriting bands
    pub fn underwriting_bands() -> Vec<Band<DecisionStatus>> {
        vec![
            Band::at_least(DecisionStatus::Rejected, 0.8),
            Band::at_least(DecisionStatus::ManualReview, 0.6),
            Band::at_least(DecisionStatus::ConditionalApproval, 0.4),
            Band::at_least(DecisionStatus::AutoApproved, 0.0),
        ]
    }

    /// Default claims bands
    pub fn fraud_bands() -> Vec<Band<DecisionStatus>> {
        vec![
            Band::above(DecisionStatus::RequiresInvestigation, 0.7),
            Band::above(DecisionStatus::ManualReview, 0.4),
            Band::at_least(DecisionStatus::AutoApproved, 0.0),
        ]
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Premium loading parameters for risk mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumPolicy {
    /// Loading per unit of composite score
    pub base_rate: Decimal,
    /// Upper bound on the score-driven part of the loading
    pub cap_rate: Decimal,
    /// Extra loadings added when the score passes a threshold
    pub surcharges: Vec<Surcharge>,
}

impl Default for PremiumPolicy {
    fn default() -> Self {
        Self {
            base_rate: dec!(0.5),
            cap_rate: dec!(0.5),
            surcharges: Vec::new(),
        }
    }
}

/// Surcharge applied when the score strictly exceeds `above`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    pub above: f64,
    pub rate: Decimal,
}

impl PremiumPolicy {
    /// `min(score·base_rate, cap_rate)` plus every surcharge the score passes
    pub fn loading(&self, score: Score) -> Rate {
        let score_dec = to_decimal(score);
        let base = (score_dec * self.base_rate).min(self.cap_rate);
        let surcharge: Decimal = self
            .surcharges
            .iter()
            .filter(|surcharge| score.value() > surcharge.above)
            .map(|surcharge| surcharge.rate)
            .sum();
        Rate::new((base + surcharge).round_dp(4))
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.base_rate.is_sign_negative() || self.cap_rate.is_sign_negative() {
            return Err(ConfigurationError::invalid_policy(
                "premium rates must be non-negative",
            ));
        }
        for surcharge in &self.surcharges {
            if !Score::is_unit(surcharge.above) || surcharge.rate.is_sign_negative() {
                return Err(ConfigurationError::invalid_policy(format!(
                    "surcharge above {} at rate {} is out of range",
                    surcharge.above, surcharge.rate
                )));
            }
        }
        Ok(())
    }
}

/// Settlement estimate parameters for fraud mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    /// Product multiplier applied to the claimed amount
    pub multiplier: Decimal,
    /// Scores strictly above this incur the penalty
    pub penalty_threshold: f64,
    /// Fraction withheld when the penalty applies
    pub penalty: Decimal,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            multiplier: dec!(1),
            penalty_threshold: 0.4,
            penalty: dec!(0.25),
        }
    }
}

impl SettlementPolicy {
    /// `amount·multiplier·(1 − penalty)` above the threshold, else `amount·multiplier`
    ///
    /// Fails when the scaled amount does not fit in a `Decimal`.
    pub fn estimate(&self, amount: &Money, score: Score) -> Result<Money, CoreError> {
        let gross = amount.checked_multiply(self.multiplier)?;
        let estimate = if score.value() > self.penalty_threshold {
            gross.checked_multiply(Decimal::ONE - self.penalty)?
        } else {
            gross
        };
        Ok(estimate.round_to_currency())
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.multiplier.is_sign_negative() && !self.multiplier.is_zero() {
            return Err(ConfigurationError::invalid_policy(
                "settlement multiplier must be non-negative",
            ));
        }
        if !Score::is_unit(self.penalty_threshold) {
            return Err(ConfigurationError::invalid_policy(format!(
                "penalty threshold {} is outside [0, 1]",
                self.penalty_threshold
            )));
        }
        if self.penalty < Decimal::ZERO || self.penalty > Decimal::ONE {
            return Err(ConfigurationError::invalid_policy(format!(
                "penalty {} is outside [0, 1]",
                self.penalty
            )));
        }
        Ok(())
    }
}

/// Decision section of a product line entry, as written in the factor table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionDefinition {
    pub bands: Option<Vec<Band<DecisionStatus>>>,
    pub amount_field: Option<String>,
    pub escalation_ceiling: Option<Decimal>,
    pub premium: Option<PremiumPolicy>,
    pub settlement: Option<SettlementPolicy>,
}

/// How the monetary adjustment is derived
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentPolicy {
    Premium(PremiumPolicy),
    Settlement(SettlementPolicy),
}

/// Monetary consequence of a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonetaryAdjustment {
    /// Premium loading as a fraction of the base premium
    Premium { loading: Rate },
    /// Settlement estimate; `None` means no settlement can be quoted,
    /// which is different from a settlement of zero
    Settlement { estimate: Option<Money> },
}

/// The resolved decision for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub status: DecisionStatus,
    /// True when the amount override raised the banded status
    pub escalated: bool,
    pub adjustment: MonetaryAdjustment,
}

/// Parametrised decision state machine for one product line and mode
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPolicy {
    bands: Bands<DecisionStatus>,
    amount_field: Option<String>,
    escalation_ceiling: Option<Decimal>,
    adjustment: AdjustmentPolicy,
}

impl DecisionPolicy {
    /// Builds a policy, filling in the defaults for `mode`
    pub fn compile(
        definition: DecisionDefinition,
        mode: AssessmentMode,
    ) -> Result<Self, ConfigurationError> {
        let bands = definition.bands.unwrap_or_else(|| match mode {
            AssessmentMode::Risk => DecisionStatus::underwriting_bands(),
            AssessmentMode::Fraud => DecisionStatus::fraud_bands(),
        });
        let bands = Bands::new(bands)?;

        if let Some(ceiling) = definition.escalation_ceiling {
            if ceiling.is_sign_negative() && !ceiling.is_zero() {
                return Err(ConfigurationError::invalid_policy(format!(
                    "escalation ceiling {ceiling} is negative"
                )));
            }
        }
        if definition.escalation_ceiling.is_some() && definition.amount_field.is_none() {
            return Err(ConfigurationError::invalid_policy(
                "escalation ceiling set without an amount field",
            ));
        }

        let adjustment = match mode {
            AssessmentMode::Risk => {
                if definition.settlement.is_some() {
                    return Err(ConfigurationError::invalid_policy(
                        "settlement policy is only valid in fraud mode",
                    ));
                }
                let premium = definition.premium.unwrap_or_default();
                premium.validate()?;
                AdjustmentPolicy::Premium(premium)
            }
            AssessmentMode::Fraud => {
                if definition.premium.is_some() {
                    return Err(ConfigurationError::invalid_policy(
                        "premium policy is only valid in risk mode",
                    ));
                }
                let settlement = definition.settlement.unwrap_or_default();
                settlement.validate()?;
                AdjustmentPolicy::Settlement(settlement)
            }
        };

        Ok(Self {
            bands,
            amount_field: definition.amount_field,
            escalation_ceiling: definition.escalation_ceiling,
            adjustment,
        })
    }

    /// Field holding the monetary amount, if any
    pub fn amount_field(&self) -> Option<&str> {
        self.amount_field.as_deref()
    }

    /// Resolves a composite score into a decision
    ///
    /// Fails when the amount field is present but not numeric, or when the
    /// settlement estimate for it overflows.
    pub fn resolve(
        &self,
        score: Score,
        subject: &SubjectRecord<'_>,
        currency: Currency,
    ) -> Result<Decision, EvaluationError> {
        let banded = self.bands.classify(score);

        let amount = match &self.amount_field {
            Some(field) => subject
                .decimal(field)?
                .map(|amount| Money::new(amount, currency)),
            None => None,
        };

        let over_ceiling = matches!(
            (amount, self.escalation_ceiling),
            (Some(amount), Some(ceiling)) if amount.exceeds(ceiling)
        );
        let status = if over_ceiling {
            banded.max(DecisionStatus::ManualReview)
        } else {
            banded
        };

        let adjustment = match &self.adjustment {
            AdjustmentPolicy::Premium(premium) => MonetaryAdjustment::Premium {
                loading: premium.loading(score),
            },
            AdjustmentPolicy::Settlement(settlement) => {
                let estimate = match amount.filter(|_| !status.blocks_settlement()) {
                    Some(amount) => Some(settlement.estimate(&amount, score).map_err(|_| {
                        EvaluationError::AmountOverflow {
                            field: self.amount_field.clone().unwrap_or_default(),
                            amount: amount.amount(),
                        }
                    })?),
                    None => None,
                };
                MonetaryAdjustment::Settlement { estimate }
            }
        };

        Ok(Decision {
            status,
            escalated: status != banded,
            adjustment,
        })
    }
}

fn to_decimal(score: Score) -> Decimal {
    Decimal::from_f64(score.value())
        .unwrap_or_default()
        .round_dp(6)
}
