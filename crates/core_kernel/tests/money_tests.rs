//! Integration tests for the Money and Rate types
//!
//! Covers rounding, comparisons against escalation ceilings and the
//! serialized forms that appear in verdicts.

use core_kernel::{CoreError, Currency, Money, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::USD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_zero_amount_keeps_currency() {
        let m = Money::new(dec!(0.00001), Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_default_currency_is_usd() {
        assert_eq!(Currency::default(), Currency::USD);
    }
}

mod comparisons {
    use super::*;

    #[test]
    fn test_exceeds_above_limit() {
        let claim = Money::new(dec!(150000), Currency::USD);
        assert!(claim.exceeds(dec!(100000)));
    }

    #[test]
    fn test_exceeds_not_at_limit() {
        let claim = Money::new(dec!(100000), Currency::USD);
        assert!(!claim.exceeds(dec!(100000)));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_multiply_by_multiplier_and_penalty() {
        let base = Money::new(dec!(5000), Currency::USD);
        let estimate = base
            .checked_multiply(dec!(0.9))
            .and_then(|gross| gross.checked_multiply(dec!(0.75)))
            .unwrap()
            .round_to_currency();
        assert_eq!(estimate.amount(), dec!(3375.00));
    }

    #[test]
    fn test_multiply_overflow_is_an_error() {
        let huge = Money::new(dec!(70000000000000000000000000000), Currency::USD);
        let result = huge.checked_multiply(dec!(1.5));

        assert_eq!(
            result,
            Err(CoreError::AmountOverflow {
                amount: dec!(70000000000000000000000000000),
                factor: dec!(1.5),
            })
        );
        assert!(huge.checked_multiply(dec!(1)).is_ok());
    }

    #[test]
    fn test_display_uses_currency_precision() {
        assert_eq!(Money::new(dec!(1234.5), Currency::USD).to_string(), "1234.50 USD");
        assert_eq!(Money::new(dec!(1234), Currency::JPY).to_string(), "1234 JPY");
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_serializes_amount_and_code() {
        let json = serde_json::to_value(Money::new(dec!(3750), Currency::GBP)).unwrap();
        assert_eq!(json["currency"], "GBP");
        assert_eq!(json["amount"], "3750");
    }

    #[test]
    fn test_rate_serializes_as_decimal() {
        let json = serde_json::to_string(&Rate::new(dec!(0.25))).unwrap();
        assert_eq!(json, "\"0.25\"");
    }

    #[test]
    fn test_rate_ordering_supports_min() {
        let loading = Rate::new(dec!(0.6));
        let cap = Rate::new(dec!(0.5));
        assert_eq!(loading.min(cap), cap);
    }
}
