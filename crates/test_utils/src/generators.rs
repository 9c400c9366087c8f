//! Property-based test data generators
//!
//! Proptest strategies for domain values, shared by the per-crate
//! property tests.

use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_reconciliation::Direction;

/// A date in the 2020s with a safe day-of-month
pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2030, 1u32..13, 1u32..29)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A non-negative BRL amount with two decimal places
pub fn arb_brl_amount() -> impl Strategy<Value = Money> {
    (0i64..100_000_000).prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::BRL))
}

/// A strictly positive BRL amount with two decimal places
pub fn arb_brl_positive() -> impl Strategy<Value = Money> {
    (1i64..100_000_000).prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::BRL))
}

/// Credit or debit
pub fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Credit), Just(Direction::Debit)]
}

/// Hours in 0.25 steps between 0.25 and 12
pub fn arb_hours() -> impl Strategy<Value = Decimal> {
    (1i64..48).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}

/// An uppercase FITID-looking token, possibly empty
pub fn arb_fit_id() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z0-9]{0,12}").unwrap()
}

/// A random company name for party fixtures
pub fn fake_company_name() -> String {
    CompanyName().fake()
}

/// A random email for consultant fixtures
pub fn fake_email() -> String {
    SafeEmail().fake()
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_amounts_are_non_negative(money in arb_brl_amount()) {
            prop_assert!(!money.is_negative());
        }

        #[test]
        fn generated_hours_are_positive(hours in arb_hours()) {
            prop_assert!(hours > Decimal::ZERO);
            prop_assert!(hours <= Decimal::new(12, 0));
        }
    }
}
