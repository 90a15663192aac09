//! Product lines and assessment modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// Insurance product line selecting the applicable factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductLine {
    Auto,
    Health,
    Home,
    Life,
    /// Catch-all configuration shared by lines without their own entry
    General,
}

impl ProductLine {
    /// All product lines in declaration order
    pub const ALL: [ProductLine; 5] = [
        ProductLine::Auto,
        ProductLine::Health,
        ProductLine::Home,
        ProductLine::Life,
        ProductLine::General,
    ];

    /// Returns the upper-case key used in configuration
    pub fn code(&self) -> &'static str {
        match self {
            ProductLine::Auto => "AUTO",
            ProductLine::Health => "HEALTH",
            ProductLine::Home => "HOME",
            ProductLine::Life => "LIFE",
            ProductLine::General => "GENERAL",
        }
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ProductLine {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        ProductLine::ALL
            .into_iter()
            .find(|line| line.code() == key)
            .ok_or_else(|| ConfigurationError::UnknownProductLine(s.to_string()))
    }
}

/// What the composite score measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentMode {
    /// Underwriting risk of a policy application
    #[serde(alias = "underwriting")]
    Risk,
    /// Fraud likelihood of a claim
    #[serde(alias = "claims")]
    Fraud,
}

impl AssessmentMode {
    /// Returns the lower-case key used in configuration
    pub fn code(&self) -> &'static str {
        match self {
            AssessmentMode::Risk => "risk",
            AssessmentMode::Fraud => "fraud",
        }
    }
}

impl fmt::Display for AssessmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AssessmentMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "risk" | "underwriting" => Ok(AssessmentMode::Risk),
            "fraud" | "claims" => Ok(AssessmentMode::Fraud),
            _ => Err(ConfigurationError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_line_parse_is_case_insensitive() {
        assert_eq!("auto".parse::<ProductLine>().unwrap(), ProductLine::Auto);
        assert_eq!(" Health ".parse::<ProductLine>().unwrap(), ProductLine::Health);
    }

    #[test]
    fn test_unknown_product_line() {
        let err = "MARINE".parse::<ProductLine>().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownProductLine(key) if key == "MARINE"));
    }

    #[test]
    fn test_mode_aliases() {
        assert_eq!("underwriting".parse::<AssessmentMode>().unwrap(), AssessmentMode::Risk);
        assert_eq!("claims".parse::<AssessmentMode>().unwrap(), AssessmentMode::Fraud);
        assert!("pricing".parse::<AssessmentMode>().is_err());
    }

    #[test]
    fn test_serde_keys() {
        let json = serde_json::to_string(&ProductLine::Life).unwrap();
        assert_eq!(json, "\"LIFE\"");
        let mode: AssessmentMode = serde_json::from_str("\"fraud\"").unwrap();
        assert_eq!(mode, AssessmentMode::Fraud);
    }
}
