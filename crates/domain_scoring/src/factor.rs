//! Factor specifications and their scoring rules
//!
//! A factor table is read in two stages. The `*Definition` types mirror the
//! JSON layout and are deserialized with serde. [`FactorSpec::compile`] then
//! validates a definition and turns it into an immutable [`FactorSpec`] whose
//! [`Rule`] is ready to score: keywords lower-cased, patterns compiled,
//! lookup keys normalised and every configured score checked to lie in
//! `[0, 1]`.
//!
//! Rules only know how to score a value. Pulling that value out of a
//! subject, and falling back to the neutral default, is done by
//! [`crate::evaluator`].

use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use core_kernel::Score;

use crate::error::ConfigurationError;

/// Score used when a factor's input field is absent
pub const DEFAULT_NEUTRAL_SCORE: f64 = 0.3;

fn default_neutral() -> f64 {
    DEFAULT_NEUTRAL_SCORE
}

fn default_in_range() -> f64 {
    0.8
}

fn default_out_of_range() -> f64 {
    0.2
}

fn default_cap() -> f64 {
    1.0
}

fn default_otherwise() -> f64 {
    0.1
}

// ============================================================================
// Raw definitions
// ============================================================================

/// A factor as written in the factor table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorDefinition {
    pub name: String,
    pub weight: f64,
    #[serde(default = "default_neutral")]
    pub neutral: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    pub rule: RuleDefinition,
}

/// A scoring rule as written in the factor table, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    Threshold {
        field: String,
        cutoff: f64,
        #[serde(default)]
        floor: f64,
        #[serde(default = "default_neutral")]
        baseline: f64,
    },
    RangeList {
        field: String,
        ranges: Vec<(f64, f64)>,
        #[serde(default = "default_in_range")]
        in_range: f64,
        #[serde(default = "default_out_of_range")]
        out_of_range: f64,
    },
    KeywordSet {
        field: String,
        keywords: Vec<String>,
        per_match: f64,
        #[serde(default = "default_cap")]
        cap: f64,
    },
    LookupTable {
        field: String,
        table: BTreeMap<String, f64>,
        #[serde(rename = "default", default = "default_neutral")]
        default_score: f64,
    },
    PatternSet {
        field: String,
        patterns: Vec<String>,
        per_match: f64,
        #[serde(default = "default_cap")]
        cap: f64,
    },
    RoundAmount {
        field: String,
        bands: Vec<RoundBandDefinition>,
        #[serde(default = "default_otherwise")]
        otherwise: f64,
    },
    DateGap {
        from: String,
        to: String,
        bands: Vec<GapBandDefinition>,
        #[serde(default = "default_otherwise")]
        otherwise: f64,
    },
    ValueBands {
        field: String,
        /// Divides the value by this field before banding
        #[serde(default)]
        per: Option<String>,
        bands: Vec<ValueBandDefinition>,
        #[serde(default = "default_otherwise")]
        otherwise: f64,
    },
    ItemCount {
        field: String,
        bands: Vec<ValueBandDefinition>,
        #[serde(default = "default_otherwise")]
        otherwise: f64,
    },
}

/// One band of a round-amount rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundBandDefinition {
    pub multiple: f64,
    #[serde(default)]
    pub minimum: f64,
    pub score: f64,
}

/// One band of a date-gap rule; at least one bound must be set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapBandDefinition {
    #[serde(default)]
    pub min_days: Option<i64>,
    #[serde(default)]
    pub max_days: Option<i64>,
    pub score: f64,
}

/// One band of a value or item-count rule; bounds are exclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueBandDefinition {
    #[serde(default)]
    pub above: Option<f64>,
    #[serde(default)]
    pub below: Option<f64>,
    pub score: f64,
}

// ============================================================================
// Compiled rules
// ============================================================================

/// A validated factor ready for evaluation
#[derive(Debug, Clone)]
pub struct FactorSpec {
    pub name: String,
    pub weight: f64,
    pub neutral: Score,
    pub description: Option<String>,
    pub recommendation: Option<String>,
    pub rule: Rule,
}

/// A compiled scoring rule
#[derive(Debug, Clone)]
pub enum Rule {
    Threshold(ThresholdRule),
    RangeList(RangeListRule),
    KeywordSet(KeywordSetRule),
    LookupTable(LookupTableRule),
    PatternSet(PatternSetRule),
    RoundAmount(RoundAmountRule),
    DateGap(DateGapRule),
    ValueBands(ValueBandsRule),
    ItemCount(ItemCountRule),
}

impl Rule {
    /// Returns the rule kind as written in configuration
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Threshold(_) => "threshold",
            Rule::RangeList(_) => "range_list",
            Rule::KeywordSet(_) => "keyword_set",
            Rule::LookupTable(_) => "lookup_table",
            Rule::PatternSet(_) => "pattern_set",
            Rule::RoundAmount(_) => "round_amount",
            Rule::DateGap(_) => "date_gap",
            Rule::ValueBands(_) => "value_bands",
            Rule::ItemCount(_) => "item_count",
        }
    }
}

/// Scales a value toward a cutoff once it passes a floor
#[derive(Debug, Clone)]
pub struct ThresholdRule {
    pub field: String,
    pub cutoff: f64,
    pub floor: f64,
    pub baseline: Score,
}

impl ThresholdRule {
    /// `min(value / cutoff, 1)` above the floor, the baseline otherwise
    pub fn score(&self, value: f64) -> Score {
        if value > self.floor {
            Score::new((value / self.cutoff).min(1.0))
        } else {
            self.baseline
        }
    }
}

/// Flags values falling in any of a list of inclusive ranges
#[derive(Debug, Clone)]
pub struct RangeListRule {
    pub field: String,
    pub ranges: Vec<(f64, f64)>,
    pub in_range: Score,
    pub out_of_range: Score,
}

impl RangeListRule {
    /// Returns the first range containing `value`
    pub fn matching_range(&self, value: f64) -> Option<(f64, f64)> {
        self.ranges
            .iter()
            .copied()
            .find(|(low, high)| (*low..=*high).contains(&value))
    }

    pub fn score(&self, value: f64) -> Score {
        if self.matching_range(value).is_some() {
            self.in_range
        } else {
            self.out_of_range
        }
    }
}

/// Counts distinct keywords contained in free text
#[derive(Debug, Clone)]
pub struct KeywordSetRule {
    pub field: String,
    pub keywords: Vec<String>,
    pub per_match: f64,
    pub cap: Score,
}

impl KeywordSetRule {
    /// Returns the configured keywords found in `text`, each at most once
    pub fn matches<'r>(&'r self, text: &str) -> Vec<&'r str> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|keyword| haystack.contains(keyword.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn score(&self, match_count: usize) -> Score {
        capped(match_count, self.per_match, self.cap)
    }
}

/// Maps normalised categories to scores
#[derive(Debug, Clone)]
pub struct LookupTableRule {
    pub field: String,
    pub table: BTreeMap<String, Score>,
    pub default_score: Score,
}

impl LookupTableRule {
    /// Looks up one category after normalisation
    pub fn lookup(&self, category: &str) -> Option<Score> {
        self.table.get(&normalize_category(category)).copied()
    }

    /// Scores a list of categories, keeping the worst signal
    ///
    /// Returns the score and whether any category was found in the table.
    pub fn score<S: AsRef<str>>(&self, categories: &[S]) -> (Score, bool) {
        categories
            .iter()
            .filter_map(|category| self.lookup(category.as_ref()))
            .max()
            .map_or((self.default_score, false), |score| (score, true))
    }
}

/// Counts distinct regular expressions matching free text
#[derive(Debug, Clone)]
pub struct PatternSetRule {
    pub field: String,
    pub patterns: Vec<Regex>,
    pub per_match: f64,
    pub cap: Score,
}

impl PatternSetRule {
    /// Returns the patterns that match `text`, each at most once
    pub fn matches<'r>(&'r self, text: &str) -> Vec<&'r str> {
        self.patterns
            .iter()
            .filter(|pattern| pattern.is_match(text))
            .map(Regex::as_str)
            .collect()
    }

    pub fn score(&self, match_count: usize) -> Score {
        capped(match_count, self.per_match, self.cap)
    }
}

/// Flags amounts that are exact multiples of a round figure
#[derive(Debug, Clone)]
pub struct RoundAmountRule {
    pub field: String,
    pub bands: Vec<RoundBand>,
    pub otherwise: Score,
}

#[derive(Debug, Clone)]
pub struct RoundBand {
    pub multiple: Decimal,
    pub minimum: Decimal,
    pub score: Score,
}

impl RoundAmountRule {
    /// Returns the first band the amount falls in
    pub fn matching_band(&self, amount: Decimal) -> Option<&RoundBand> {
        self.bands
            .iter()
            .find(|band| amount >= band.minimum && (amount % band.multiple).is_zero())
    }

    pub fn score(&self, amount: Decimal) -> Score {
        self.matching_band(amount)
            .map_or(self.otherwise, |band| band.score)
    }
}

/// Scores the number of days between two dates
#[derive(Debug, Clone)]
pub struct DateGapRule {
    pub from: String,
    pub to: String,
    pub bands: Vec<GapBand>,
    pub otherwise: Score,
}

#[derive(Debug, Clone)]
pub struct GapBand {
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub score: Score,
}

impl GapBand {
    pub fn contains(&self, days: i64) -> bool {
        self.min_days.map_or(true, |min| days >= min)
            && self.max_days.map_or(true, |max| days <= max)
    }
}

impl DateGapRule {
    pub fn score(&self, days: i64) -> Score {
        self.bands
            .iter()
            .find(|band| band.contains(days))
            .map_or(self.otherwise, |band| band.score)
    }
}

/// An open interval of values mapped to a score
#[derive(Debug, Clone, PartialEq)]
pub struct ValueBand {
    pub above: Option<f64>,
    pub below: Option<f64>,
    pub score: Score,
}

impl ValueBand {
    pub fn contains(&self, value: f64) -> bool {
        self.above.map_or(true, |above| value > above)
            && self.below.map_or(true, |below| value < below)
    }
}

impl fmt::Display for ValueBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.above, self.below) {
            (Some(above), Some(below)) => write!(f, "between {above} and {below}"),
            (Some(above), None) => write!(f, "above {above}"),
            (None, Some(below)) => write!(f, "below {below}"),
            (None, None) => write!(f, "unbounded"),
        }
    }
}

fn banded(bands: &[ValueBand], value: f64) -> Option<&ValueBand> {
    bands.iter().find(|band| band.contains(value))
}

/// Bands a numeric field, or its ratio to another field
#[derive(Debug, Clone)]
pub struct ValueBandsRule {
    pub field: String,
    pub per: Option<String>,
    pub bands: Vec<ValueBand>,
    pub otherwise: Score,
}

impl ValueBandsRule {
    /// Returns the first band containing `value`
    pub fn matching_band(&self, value: f64) -> Option<&ValueBand> {
        banded(&self.bands, value)
    }

    pub fn score(&self, value: f64) -> Score {
        self.matching_band(value)
            .map_or(self.otherwise, |band| band.score)
    }
}

/// Bands the number of entries in a list field
#[derive(Debug, Clone)]
pub struct ItemCountRule {
    pub field: String,
    pub bands: Vec<ValueBand>,
    pub otherwise: Score,
}

impl ItemCountRule {
    pub fn score(&self, count: usize) -> Score {
        banded(&self.bands, count as f64).map_or(self.otherwise, |band| band.score)
    }
}

fn capped(match_count: usize, per_match: f64, cap: Score) -> Score {
    Score::new((match_count as f64 * per_match).min(cap.value()))
}

/// Normalises a category for table lookup
///
/// Trims, lower-cases, and maps spaces and hyphens to underscores, so
/// `"Sports Car"`, `"sports-car"` and `"sports_car"` are the same key.
pub fn normalize_category(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// ============================================================================
// Compilation
// ============================================================================

impl FactorSpec {
    /// Validates a definition and compiles its rule
    pub fn compile(definition: FactorDefinition) -> Result<Self, ConfigurationError> {
        let FactorDefinition {
            name,
            weight,
            neutral,
            description,
            recommendation,
            rule,
        } = definition;

        if name.trim().is_empty() {
            return Err(ConfigurationError::invalid_factor(name, "name must not be blank"));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigurationError::invalid_factor(
                &name,
                format!("weight must be a non-negative number, got {weight}"),
            ));
        }

        let compiler = RuleCompiler { factor: &name };
        let neutral = compiler.unit("neutral", neutral)?;
        let rule = compiler.compile(rule)?;

        Ok(Self {
            name,
            weight,
            neutral,
            description,
            recommendation,
            rule,
        })
    }
}

struct RuleCompiler<'a> {
    factor: &'a str,
}

impl RuleCompiler<'_> {
    fn compile(&self, rule: RuleDefinition) -> Result<Rule, ConfigurationError> {
        let compiled = match rule {
            RuleDefinition::Threshold {
                field,
                cutoff,
                floor,
                baseline,
            } => {
                if !cutoff.is_finite() || cutoff <= 0.0 {
                    return Err(self.invalid(format!("cutoff must be positive, got {cutoff}")));
                }
                if !floor.is_finite() {
                    return Err(self.invalid("floor must be finite"));
                }
                Rule::Threshold(ThresholdRule {
                    field: self.field(field)?,
                    cutoff,
                    floor,
                    baseline: self.unit("baseline", baseline)?,
                })
            }
            RuleDefinition::RangeList {
                field,
                ranges,
                in_range,
                out_of_range,
            } => {
                if ranges.is_empty() {
                    return Err(self.invalid("ranges must not be empty"));
                }
                if let Some((low, high)) = ranges
                    .iter()
                    .find(|(low, high)| !low.is_finite() || !high.is_finite() || low > high)
                {
                    return Err(self.invalid(format!("range [{low}, {high}] is not ordered")));
                }
                Rule::RangeList(RangeListRule {
                    field: self.field(field)?,
                    ranges,
                    in_range: self.unit("in_range", in_range)?,
                    out_of_range: self.unit("out_of_range", out_of_range)?,
                })
            }
            RuleDefinition::KeywordSet {
                field,
                keywords,
                per_match,
                cap,
            } => {
                let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
                for keyword in keywords {
                    let keyword = keyword.trim().to_lowercase();
                    if !keyword.is_empty() && !normalized.contains(&keyword) {
                        normalized.push(keyword);
                    }
                }
                if normalized.is_empty() {
                    return Err(self.invalid("keywords must not be empty"));
                }
                Rule::KeywordSet(KeywordSetRule {
                    field: self.field(field)?,
                    keywords: normalized,
                    per_match: self.unit("per_match", per_match)?.value(),
                    cap: self.unit("cap", cap)?,
                })
            }
            RuleDefinition::LookupTable {
                field,
                table,
                default_score,
            } => {
                if table.is_empty() {
                    return Err(self.invalid("table must not be empty"));
                }
                let mut compiled = BTreeMap::new();
                for (category, score) in table {
                    let key = normalize_category(&category);
                    let score = self.unit(&format!("table entry '{category}'"), score)?;
                    if compiled.insert(key, score).is_some() {
                        return Err(self.invalid(format!(
                            "table entry '{category}' collides with another entry after normalisation"
                        )));
                    }
                }
                Rule::LookupTable(LookupTableRule {
                    field: self.field(field)?,
                    table: compiled,
                    default_score: self.unit("default", default_score)?,
                })
            }
            RuleDefinition::PatternSet {
                field,
                patterns,
                per_match,
                cap,
            } => {
                if patterns.is_empty() {
                    return Err(self.invalid("patterns must not be empty"));
                }
                let patterns = patterns
                    .iter()
                    .map(|pattern| {
                        Regex::new(&format!("(?i){pattern}")).map_err(|source| {
                            ConfigurationError::InvalidPattern {
                                factor: self.factor.to_string(),
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Rule::PatternSet(PatternSetRule {
                    field: self.field(field)?,
                    patterns,
                    per_match: self.unit("per_match", per_match)?.value(),
                    cap: self.unit("cap", cap)?,
                })
            }
            RuleDefinition::RoundAmount {
                field,
                bands,
                otherwise,
            } => {
                if bands.is_empty() {
                    return Err(self.invalid("bands must not be empty"));
                }
                let bands = bands
                    .into_iter()
                    .map(|band| {
                        let multiple = self.decimal("multiple", band.multiple)?;
                        if multiple <= Decimal::ZERO {
                            return Err(self.invalid("multiple must be positive"));
                        }
                        Ok(RoundBand {
                            multiple,
                            minimum: self.decimal("minimum", band.minimum)?,
                            score: self.unit("band score", band.score)?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Rule::RoundAmount(RoundAmountRule {
                    field: self.field(field)?,
                    bands,
                    otherwise: self.unit("otherwise", otherwise)?,
                })
            }
            RuleDefinition::DateGap {
                from,
                to,
                bands,
                otherwise,
            } => {
                if bands.is_empty() {
                    return Err(self.invalid("bands must not be empty"));
                }
                let bands = bands
                    .into_iter()
                    .map(|band| match (band.min_days, band.max_days) {
                        (None, None) => Err(self.invalid("date band needs min_days or max_days")),
                        (Some(min), Some(max)) if min > max => Err(self.invalid(format!(
                            "date band min_days {min} exceeds max_days {max}"
                        ))),
                        (min_days, max_days) => Ok(GapBand {
                            min_days,
                            max_days,
                            score: self.unit("band score", band.score)?,
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Rule::DateGap(DateGapRule {
                    from: self.field(from)?,
                    to: self.field(to)?,
                    bands,
                    otherwise: self.unit("otherwise", otherwise)?,
                })
            }
            RuleDefinition::ValueBands {
                field,
                per,
                bands,
                otherwise,
            } => Rule::ValueBands(ValueBandsRule {
                field: self.field(field)?,
                per: per.map(|per| self.field(per)).transpose()?,
                bands: self.value_bands(bands)?,
                otherwise: self.unit("otherwise", otherwise)?,
            }),
            RuleDefinition::ItemCount {
                field,
                bands,
                otherwise,
            } => Rule::ItemCount(ItemCountRule {
                field: self.field(field)?,
                bands: self.value_bands(bands)?,
                otherwise: self.unit("otherwise", otherwise)?,
            }),
        };
        Ok(compiled)
    }

    fn value_bands(
        &self,
        bands: Vec<ValueBandDefinition>,
    ) -> Result<Vec<ValueBand>, ConfigurationError> {
        if bands.is_empty() {
            return Err(self.invalid("bands must not be empty"));
        }
        bands
            .into_iter()
            .map(|band| {
                let bounds = [band.above, band.below];
                if bounds.iter().all(Option::is_none) {
                    return Err(self.invalid("value band needs above or below"));
                }
                if bounds.iter().flatten().any(|bound| !bound.is_finite()) {
                    return Err(self.invalid("value band bounds must be finite"));
                }
                if let (Some(above), Some(below)) = (band.above, band.below) {
                    if above >= below {
                        return Err(self.invalid(format!(
                            "value band above {above} is not below {below}"
                        )));
                    }
                }
                Ok(ValueBand {
                    above: band.above,
                    below: band.below,
                    score: self.unit("band score", band.score)?,
                })
            })
            .collect()
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigurationError {
        ConfigurationError::invalid_factor(self.factor, reason)
    }

    fn field(&self, field: String) -> Result<String, ConfigurationError> {
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed.split('.').any(str::is_empty) {
            return Err(self.invalid(format!("field path '{field}' is malformed")));
        }
        Ok(trimmed.to_string())
    }

    fn unit(&self, what: &str, value: f64) -> Result<Score, ConfigurationError> {
        Score::try_new(value)
            .map_err(|_| self.invalid(format!("{what} must lie in [0, 1], got {value}")))
    }

    fn decimal(&self, what: &str, value: f64) -> Result<Decimal, ConfigurationError> {
        Decimal::from_f64(value)
            .ok_or_else(|| self.invalid(format!("{what} is not a finite amount: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn compile(value: serde_json::Value) -> Result<FactorSpec, ConfigurationError> {
        let definition: FactorDefinition = serde_json::from_value(value).unwrap();
        FactorSpec::compile(definition)
    }

    #[test]
    fn test_threshold_scoring() {
        let rule = ThresholdRule {
            field: "age".into(),
            cutoff: 60.0,
            floor: 30.0,
            baseline: Score::new(0.3),
        };
        assert_eq!(rule.score(25.0), Score::new(0.3));
        assert_eq!(rule.score(45.0), Score::new(0.75));
        assert_eq!(rule.score(90.0), Score::ONE);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let spec = compile(json!({
            "name": "age",
            "weight": 0.2,
            "rule": { "kind": "range_list", "field": "age", "ranges": [[16, 25], [70, 100]] }
        }))
        .unwrap();
        let Rule::RangeList(rule) = &spec.rule else {
            panic!("expected range rule");
        };
        assert_eq!(rule.score(16.0), Score::new(0.8));
        assert_eq!(rule.score(25.0), Score::new(0.8));
        assert_eq!(rule.score(26.0), Score::new(0.2));
    }

    #[test]
    fn test_keywords_are_normalised_and_deduplicated() {
        let spec = compile(json!({
            "name": "narrative",
            "weight": 0.3,
            "rule": {
                "kind": "keyword_set",
                "field": "description",
                "keywords": ["Total Loss", "total loss", " staged "],
                "per_match": 0.4
            }
        }))
        .unwrap();
        let Rule::KeywordSet(rule) = &spec.rule else {
            panic!("expected keyword rule");
        };
        assert_eq!(rule.keywords, vec!["total loss", "staged"]);

        let matched = rule.matches("TOTAL LOSS, total loss again, clearly staged");
        assert_eq!(matched.len(), 2);
        assert_eq!(rule.score(matched.len()), Score::new(0.8));
        assert_eq!(rule.score(5), Score::ONE);
    }

    #[test]
    fn test_lookup_normalises_categories() {
        let spec = compile(json!({
            "name": "vehicle_type",
            "weight": 0.2,
            "rule": {
                "kind": "lookup_table",
                "field": "vehicleType",
                "table": { "sports_car": 0.8, "sedan": 0.3 },
                "default": 0.4
            }
        }))
        .unwrap();
        let Rule::LookupTable(rule) = &spec.rule else {
            panic!("expected lookup rule");
        };
        assert_eq!(rule.score(&["Sports Car"]), (Score::new(0.8), true));
        assert_eq!(rule.score(&["sedan", "sports-car"]), (Score::new(0.8), true));
        assert_eq!(rule.score(&["boat"]), (Score::new(0.4), false));
    }

    #[test]
    fn test_pattern_set_is_case_insensitive() {
        let spec = compile(json!({
            "name": "amount_language",
            "weight": 0.2,
            "rule": {
                "kind": "pattern_set",
                "field": "description",
                "patterns": ["exactly \\$?\\d[\\d,]*\\.00", "\\bpolicy limit\\b"],
                "per_match": 0.5
            }
        }))
        .unwrap();
        let Rule::PatternSet(rule) = &spec.rule else {
            panic!("expected pattern rule");
        };
        assert_eq!(rule.matches("Exactly $5,000.00 was lost").len(), 1);
        assert!(rule.matches("about 5000").is_empty());
    }

    #[test]
    fn test_round_amount_bands() {
        let rule = RoundAmountRule {
            field: "amount".into(),
            bands: vec![
                RoundBand {
                    multiple: dec!(1000),
                    minimum: dec!(1000),
                    score: Score::new(0.8),
                },
                RoundBand {
                    multiple: dec!(100),
                    minimum: dec!(100),
                    score: Score::new(0.5),
                },
            ],
            otherwise: Score::new(0.1),
        };
        assert_eq!(rule.score(dec!(5000)), Score::new(0.8));
        assert_eq!(rule.score(dec!(5000.00)), Score::new(0.8));
        assert_eq!(rule.score(dec!(700)), Score::new(0.5));
        assert_eq!(rule.score(dec!(1234.56)), Score::new(0.1));
        assert_eq!(rule.score(dec!(0)), Score::new(0.1));
    }

    #[test]
    fn test_date_gap_bands() {
        let rule = DateGapRule {
            from: "incidentDate".into(),
            to: "claimDate".into(),
            bands: vec![
                GapBand {
                    min_days: None,
                    max_days: Some(0),
                    score: Score::new(0.8),
                },
                GapBand {
                    min_days: Some(31),
                    max_days: None,
                    score: Score::new(0.5),
                },
            ],
            otherwise: Score::new(0.1),
        };
        assert_eq!(rule.score(0), Score::new(0.8));
        assert_eq!(rule.score(12), Score::new(0.1));
        assert_eq!(rule.score(45), Score::new(0.5));
    }

    #[test]
    fn test_value_bands_are_exclusive() {
        let spec = compile(json!({
            "name": "nuisance_amount",
            "weight": 0.05,
            "rule": {
                "kind": "value_bands",
                "field": "amount",
                "bands": [{ "above": 0, "below": 500, "score": 1.0 }],
                "otherwise": 0.0
            }
        }))
        .unwrap();
        let Rule::ValueBands(rule) = &spec.rule else {
            panic!("expected value band rule");
        };
        assert_eq!(rule.per, None);
        assert_eq!(rule.score(0.0), Score::ZERO);
        assert_eq!(rule.score(0.01), Score::ONE);
        assert_eq!(rule.score(499.99), Score::ONE);
        assert_eq!(rule.score(500.0), Score::ZERO);
        assert_eq!(rule.bands[0].to_string(), "between 0 and 500");
    }

    #[test]
    fn test_value_bands_first_match_wins() {
        let rule = ValueBandsRule {
            field: "amount".into(),
            per: Some("policyLimit".into()),
            bands: vec![
                ValueBand {
                    above: Some(0.95),
                    below: None,
                    score: Score::ONE,
                },
                ValueBand {
                    above: Some(0.8),
                    below: None,
                    score: Score::new(0.5),
                },
            ],
            otherwise: Score::ZERO,
        };
        assert_eq!(rule.score(0.96), Score::ONE);
        assert_eq!(rule.score(0.95), Score::new(0.5));
        assert_eq!(rule.score(0.5), Score::ZERO);
    }

    #[test]
    fn test_item_count_bands() {
        let spec = compile(json!({
            "name": "witnesses",
            "weight": 0.1,
            "rule": {
                "kind": "item_count",
                "field": "incident.witnesses",
                "bands": [{ "below": 1, "score": 0.8 }],
                "otherwise": 0.0
            }
        }))
        .unwrap();
        let Rule::ItemCount(rule) = &spec.rule else {
            panic!("expected item count rule");
        };
        assert_eq!(rule.score(0), Score::new(0.8));
        assert_eq!(rule.score(2), Score::ZERO);
    }

    #[test]
    fn test_rejects_unbounded_or_inverted_value_band() {
        let band = |bands: serde_json::Value| {
            compile(json!({
                "name": "nuisance_amount",
                "weight": 0.05,
                "rule": { "kind": "value_bands", "field": "amount", "bands": bands }
            }))
        };
        assert!(band(json!([{ "score": 0.5 }])).is_err());
        assert!(band(json!([{ "above": 500, "below": 100, "score": 0.5 }])).is_err());
        assert!(band(json!([])).is_err());
        assert!(band(json!([{ "below": 500, "score": 0.5 }])).is_ok());
    }

    #[test]
    fn test_rejects_malformed_ratio_field() {
        let err = compile(json!({
            "name": "policy_limit",
            "weight": 0.2,
            "rule": {
                "kind": "value_bands",
                "field": "amount",
                "per": "policy..limit",
                "bands": [{ "above": 0.95, "score": 1.0 }]
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFactor { .. }));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = compile(json!({
            "name": "age",
            "weight": -0.1,
            "rule": { "kind": "threshold", "field": "age", "cutoff": 60 }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFactor { factor, .. } if factor == "age"));
    }

    #[test]
    fn test_rejects_out_of_range_scores() {
        let err = compile(json!({
            "name": "vehicle_type",
            "weight": 0.2,
            "rule": {
                "kind": "lookup_table",
                "field": "vehicleType",
                "table": { "sedan": 1.3 }
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("must lie in [0, 1]"));
    }

    #[test]
    fn test_rejects_zero_cutoff() {
        assert!(compile(json!({
            "name": "age",
            "weight": 0.2,
            "rule": { "kind": "threshold", "field": "age", "cutoff": 0 }
        }))
        .is_err());
    }

    #[test]
    fn test_rejects_invalid_pattern() {
        let err = compile(json!({
            "name": "amount_language",
            "weight": 0.2,
            "rule": { "kind": "pattern_set", "field": "description", "patterns": ["(unclosed"], "per_match": 0.5 }
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert!(compile(json!({
            "name": "age",
            "weight": 0.2,
            "rule": { "kind": "range_list", "field": "age", "ranges": [[25, 16]] }
        }))
        .is_err());
    }

    #[test]
    fn test_unknown_rule_kind_fails_to_parse() {
        let result: Result<FactorDefinition, _> = serde_json::from_value(json!({
            "name": "age",
            "weight": 0.2,
            "rule": { "kind": "neural_net", "field": "age" }
        }));
        assert!(result.is_err());
    }
}
