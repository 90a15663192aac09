//! Scoring domain errors
//!
//! Three failure classes exist. Configuration errors are fatal and surface
//! when the factor table is loaded or a product line is resolved. Evaluation
//! errors describe a subject whose data has the wrong shape. Item errors wrap
//! an evaluation failure inside a batch so siblings keep running.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or resolving factor configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Product line key not recognised
    #[error("Unknown product line: {0}")]
    UnknownProductLine(String),

    /// Assessment mode not recognised
    #[error("Unknown assessment mode: {0}")]
    UnknownMode(String),

    /// No entry (and no GENERAL fallback) for the requested pair
    #[error("No factor configuration for {product_line} in {mode} mode")]
    MissingProductLine {
        product_line: String,
        mode: String,
    },

    /// The same product line and mode appear twice in one table
    #[error("Duplicate configuration entry for {product_line} in {mode} mode")]
    DuplicateEntry {
        product_line: String,
        mode: String,
    },

    /// Two factors share a name within one product line entry
    #[error("Duplicate factor '{factor}' in {product_line} configuration")]
    DuplicateFactor {
        product_line: String,
        factor: String,
    },

    /// Malformed factor specification
    #[error("Invalid factor '{factor}': {reason}")]
    InvalidFactor {
        factor: String,
        reason: String,
    },

    /// A pattern rule holds an invalid regular expression
    #[error("Invalid pattern in factor '{factor}': {source}")]
    InvalidPattern {
        factor: String,
        #[source]
        source: regex::Error,
    },

    /// Tier or status bands do not partition [0, 1]
    #[error("Invalid bands: {0}")]
    InvalidBands(String),

    /// Decision policy values out of range
    #[error("Invalid decision policy: {0}")]
    InvalidPolicy(String),

    /// Factor table is not valid JSON or has an unknown rule kind
    #[error("Failed to parse factor table: {0}")]
    Parse(#[from] serde_json::Error),

    /// Factor table file could not be read
    #[error("Factor table not readable at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine settings out of range
    #[error("Invalid engine settings: {0}")]
    InvalidSettings(String),

    /// Batch worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl ConfigurationError {
    /// Creates an invalid factor error
    pub fn invalid_factor(factor: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidFactor {
            factor: factor.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid bands error
    pub fn invalid_bands(message: impl Into<String>) -> Self {
        ConfigurationError::InvalidBands(message.into())
    }

    /// Creates an invalid policy error
    pub fn invalid_policy(message: impl Into<String>) -> Self {
        ConfigurationError::InvalidPolicy(message.into())
    }
}

/// Errors raised by subject data of the wrong shape
///
/// Absent fields are never an error; they resolve to a neutral default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The subject is not a JSON object
    #[error("Subject must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A field is present with an unusable type
    #[error("Field '{field}' expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// A numeric field holds NaN or an infinity
    #[error("Field '{field}' is not a finite number")]
    NonFinite { field: String },

    /// A date field could not be parsed
    #[error("Field '{field}' is not an ISO date: {value}")]
    InvalidDate { field: String, value: String },

    /// A number too large to hold as an exact amount
    #[error("Field '{field}' is outside the supported amount range: {value}")]
    OutOfRange { field: String, value: String },

    /// An amount that cannot be scaled into a settlement estimate
    #[error("Field '{field}' amount {amount} overflows the settlement estimate")]
    AmountOverflow { field: String, amount: Decimal },
}

impl EvaluationError {
    /// Creates a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        EvaluationError::TypeMismatch {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }
}

/// Errors returned by a single-subject assessment
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// A per-item failure inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Item {index} failed: {message}")]
pub struct ItemError {
    /// Position of the subject in the input
    pub index: usize,
    /// Identifier of the subject, when it carried one
    pub subject_id: Option<String>,
    /// Description of the fault
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_factor_display() {
        let err = ConfigurationError::invalid_factor("age_factor", "weight must be non-negative");
        assert_eq!(
            err.to_string(),
            "Invalid factor 'age_factor': weight must be non-negative"
        );
    }

    #[test]
    fn test_assessment_error_is_transparent() {
        let err: AssessmentError = EvaluationError::NotAnObject("array").into();
        assert_eq!(err.to_string(), "Subject must be a JSON object, got array");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = EvaluationError::OutOfRange {
            field: "amount".to_string(),
            value: "1e30".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field 'amount' is outside the supported amount range: 1e30"
        );
    }

    #[test]
    fn test_item_error_display() {
        let err = ItemError {
            index: 3,
            subject_id: None,
            message: "bad amount".to_string(),
        };
        assert_eq!(err.to_string(), "Item 3 failed: bad amount");
    }
}
