//! Core error types

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the kernel value types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Score out of range: {0}")]
    ScoreOutOfRange(f64),

    #[error("Amount {amount} times {factor} overflows")]
    AmountOverflow { amount: Decimal, factor: Decimal },
}
