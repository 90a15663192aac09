//! Monetary amounts for escalation and settlement
//!
//! Claimed amounts, coverage ceilings and settlement estimates are carried as
//! `rust_decimal` values so that ceiling comparisons and penalty arithmetic
//! are exact.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Digits kept on every stored amount, before currency rounding
const STORAGE_SCALE: u32 = 4;

/// ISO 4217 currencies a factor table may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    INR,
    CAD,
    AUD,
}

impl Currency {
    /// Digits after the decimal point in settled amounts
    pub fn minor_units(&self) -> u32 {
        if *self == Currency::JPY {
            0
        } else {
            2
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An amount in a currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(STORAGE_SCALE),
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// True only when the amount is strictly above `ceiling`
    pub fn exceeds(&self, ceiling: Decimal) -> bool {
        self.amount > ceiling
    }

    /// Scales the amount, keeping the currency
    ///
    /// Fails when the product does not fit in a `Decimal`.
    pub fn checked_multiply(&self, factor: Decimal) -> Result<Self, CoreError> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Self::new(amount, self.currency))
            .ok_or(CoreError::AmountOverflow {
                amount: self.amount,
                factor,
            })
    }

    /// Rounds to the currency's minor units, ties to even
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.minor_units()),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.minor_units() as usize;
        write!(f, "{:.places$} {}", self.amount, self.currency)
    }
}

/// Decimal fraction such as a premium loading (0.25 = 25%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    value: Decimal,
}

impl Rate {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    pub fn as_decimal(&self) -> Decimal {
        self.value
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.value * dec!(100)).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeds_is_strict() {
        let m = Money::new(dec!(100000), Currency::USD);
        assert!(!m.exceeds(dec!(100000)));
        assert!(m.exceeds(dec!(99999.99)));
    }

    #[test]
    fn test_round_to_currency() {
        let m = Money::new(dec!(3749.99999), Currency::USD).round_to_currency();
        assert_eq!(m.amount(), dec!(3750.00));

        let yen = Money::new(dec!(1234.5), Currency::JPY).round_to_currency();
        assert_eq!(yen.amount(), dec!(1234));
    }

    #[test]
    fn test_currency_display_is_code() {
        assert_eq!(Currency::GBP.to_string(), "GBP");
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::new(dec!(0.25)).to_string(), "25.00%");
    }
}
