//! Factor evaluation
//!
//! [`evaluate`] maps one subject and one factor to a [`FactorResult`]. It is
//! pure and never fails because data is missing: an absent field resolves to
//! the factor's neutral score and the rationale says so. It does fail when a
//! field is present with the wrong shape, since that points at a broken
//! upstream normaliser rather than an incomplete record.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::Score;

use crate::error::EvaluationError;
use crate::factor::{FactorSpec, Rule};
use crate::subject::SubjectRecord;

/// The scored outcome of one factor for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorResult {
    /// Factor name
    pub name: String,
    /// Factor score in `[0, 1]`
    pub score: Score,
    /// Configured weight
    pub weight: f64,
    /// `score * weight`
    pub contribution: f64,
    /// Human-readable explanation of the score
    pub rationale: String,
    /// True when the neutral default replaced missing data
    pub defaulted: bool,
}

impl FactorResult {
    fn scored(spec: &FactorSpec, score: Score, detail: String) -> Self {
        Self {
            name: spec.name.clone(),
            score,
            weight: spec.weight,
            contribution: score.weighted(spec.weight),
            rationale: with_description(spec, detail),
            defaulted: false,
        }
    }

    fn neutral(spec: &FactorSpec, missing: &str) -> Self {
        let detail = format!(
            "insufficient data: '{missing}' not provided, neutral score {} applied",
            spec.neutral
        );
        Self {
            name: spec.name.clone(),
            score: spec.neutral,
            weight: spec.weight,
            contribution: spec.neutral.weighted(spec.weight),
            rationale: with_description(spec, detail),
            defaulted: true,
        }
    }
}

fn with_description(spec: &FactorSpec, detail: String) -> String {
    match &spec.description {
        Some(description) => format!("{description}: {detail}"),
        None => detail,
    }
}

/// An observed value and its explanation, or the field that was missing
enum Observation {
    Scored(Score, String),
    Missing(String),
}

/// Evaluates a single factor against a subject
pub fn evaluate(
    subject: &SubjectRecord<'_>,
    spec: &FactorSpec,
) -> Result<FactorResult, EvaluationError> {
    let observation = match &spec.rule {
        Rule::Threshold(rule) => match subject.number(&rule.field)? {
            Some(value) => {
                let score = rule.score(value);
                let detail = if value > rule.floor {
                    format!("{} {} against cutoff {}", rule.field, value, rule.cutoff)
                } else {
                    format!(
                        "{} {} at or below floor {}, baseline applied",
                        rule.field, value, rule.floor
                    )
                };
                Observation::Scored(score, detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::RangeList(rule) => match subject.number(&rule.field)? {
            Some(value) => {
                let detail = match rule.matching_range(value) {
                    Some((low, high)) => {
                        format!("{} {} within listed range {}-{}", rule.field, value, low, high)
                    }
                    None => format!("{} {} outside listed ranges", rule.field, value),
                };
                Observation::Scored(rule.score(value), detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::KeywordSet(rule) => match subject.text(&rule.field)? {
            Some(text) => {
                let matched = rule.matches(&text);
                let detail = if matched.is_empty() {
                    format!("no indicators found in {}", rule.field)
                } else {
                    format!(
                        "matched {} of {} indicators: {}",
                        matched.len(),
                        rule.keywords.len(),
                        matched.join(", ")
                    )
                };
                Observation::Scored(rule.score(matched.len()), detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::LookupTable(rule) => match subject.categories(&rule.field)? {
            Some(categories) => {
                let (score, found) = rule.score(categories.as_slice());
                let listed = categories.join(", ");
                let detail = if found {
                    format!("{} '{}' scored from table", rule.field, listed)
                } else {
                    format!("{} '{}' not in table, default applied", rule.field, listed)
                };
                Observation::Scored(score, detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::PatternSet(rule) => match subject.text(&rule.field)? {
            Some(text) => {
                let matched = rule.matches(&text);
                let detail = if matched.is_empty() {
                    format!("no suspicious phrasing found in {}", rule.field)
                } else {
                    format!(
                        "matched {} of {} patterns in {}",
                        matched.len(),
                        rule.patterns.len(),
                        rule.field
                    )
                };
                Observation::Scored(rule.score(matched.len()), detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::RoundAmount(rule) => match subject.decimal(&rule.field)? {
            Some(amount) => {
                let detail = match rule.matching_band(amount) {
                    Some(band) => format!(
                        "{} {} is an exact multiple of {}",
                        rule.field,
                        amount.normalize(),
                        band.multiple.normalize()
                    ),
                    None => format!("{} {} shows no round pattern", rule.field, amount.normalize()),
                };
                Observation::Scored(rule.score(amount), detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
        Rule::DateGap(rule) => {
            match (subject.date(&rule.from)?, subject.date(&rule.to)?) {
                (Some(from), Some(to)) => {
                    let days = (to - from).num_days();
                    let detail = format!("{} days between {} and {}", days, rule.from, rule.to);
                    Observation::Scored(rule.score(days), detail)
                }
                (None, _) => Observation::Missing(rule.from.clone()),
                (_, None) => Observation::Missing(rule.to.clone()),
            }
        }
        Rule::ValueBands(rule) => match (subject.number(&rule.field)?, &rule.per) {
            (None, _) => Observation::Missing(rule.field.clone()),
            (Some(value), None) => {
                let detail = match rule.matching_band(value) {
                    Some(band) => format!("{} {} is {}", rule.field, value, band),
                    None => format!("{} {} outside configured bands", rule.field, value),
                };
                Observation::Scored(rule.score(value), detail)
            }
            (Some(value), Some(per)) => match subject.number(per)? {
                Some(base) if base > 0.0 => {
                    let ratio = value / base;
                    let detail = format!("{} is {:.2} of {}", rule.field, ratio, per);
                    Observation::Scored(rule.score(ratio), detail)
                }
                _ => Observation::Missing(per.clone()),
            },
        },
        Rule::ItemCount(rule) => match subject.item_count(&rule.field)? {
            Some(count) => {
                let detail = format!("{} lists {} entries", rule.field, count);
                Observation::Scored(rule.score(count), detail)
            }
            None => Observation::Missing(rule.field.clone()),
        },
    };

    let result = match observation {
        Observation::Scored(score, detail) => FactorResult::scored(spec, score, detail),
        Observation::Missing(field) => {
            warn!(
                factor = %spec.name,
                field = %field,
                neutral = spec.neutral.value(),
                "Missing input, neutral default substituted"
            );
            FactorResult::neutral(spec, &field)
        }
    };

    debug!(
        factor = %result.name,
        kind = spec.rule.kind(),
        score = result.score.value(),
        contribution = result.contribution,
        "Factor evaluated"
    );

    Ok(result)
}
