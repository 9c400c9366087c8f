//! Unit tests for the Money module
//!
//! Tests cover creation, arithmetic, ledger rounding and currency handling.

use core_kernel::{Money, Currency, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::BRL);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::BRL);
    }

    #[test]
    fn test_brl_shortcut_uses_default_currency() {
        let m = Money::brl(dec!(10));
        assert_eq!(m.currency(), Currency::default());
    }

    #[test]
    fn test_from_minor_converts_centavos() {
        let m = Money::from_minor(12345, Currency::BRL);
        assert_eq!(m.amount(), dec!(123.45));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_addition_same_currency() {
        let total = Money::brl(dec!(100.00)) + Money::brl(dec!(23.45));
        assert_eq!(total.amount(), dec!(123.45));
    }

    #[test]
    fn test_checked_add_rejects_currency_mix() {
        let brl = Money::brl(dec!(1));
        let usd = Money::new(dec!(1), Currency::USD);
        assert!(matches!(
            brl.checked_add(&usd),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_negation_flips_sign() {
        let m = -Money::brl(dec!(10.00));
        assert!(m.is_negative());
        assert_eq!(m.abs().amount(), dec!(10.00));
    }

    #[test]
    fn test_multiply_by_hours() {
        let rate = Money::brl(dec!(180.00));
        assert_eq!(rate.multiply(dec!(7.5)).amount(), dec!(1350.00));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_ledger_half_up_at_midpoint() {
        assert_eq!(Money::brl(dec!(0.125)).round_ledger().amount(), dec!(0.13));
        assert_eq!(Money::brl(dec!(0.124)).round_ledger().amount(), dec!(0.12));
    }

    #[test]
    fn test_round_ledger_negative_midpoint_away_from_zero() {
        assert_eq!(
            Money::brl(dec!(-0.125)).round_ledger().amount(),
            dec!(-0.13)
        );
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_rate_from_percentage_round_trips() {
        let rate = Rate::from_percentage(dec!(2.5));
        assert_eq!(rate.as_decimal(), dec!(0.025));
        assert_eq!(rate.as_percentage(), dec!(2.500));
    }

    #[test]
    fn test_rate_applies_to_money() {
        let interest = Rate::from_percentage(dec!(1.0)).apply(&Money::brl(dec!(500.00)));
        assert_eq!(interest.amount(), dec!(5.00));
    }
}
