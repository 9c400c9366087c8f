//! Custom assertion helpers for domain types

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_ledger::{EntryStatus, LedgerEntry};

/// Asserts two decimals are equal ignoring trailing-zero scale
///
/// `10.5` and `10.50` compare equal in Postgres but not via `assert_eq!`
/// on normalized/unnormalized `Decimal`s; this helper normalizes both.
pub fn assert_decimal_eq(left: Decimal, right: Decimal) {
    assert_eq!(
        left.normalize(),
        right.normalize(),
        "decimals differ: {left} vs {right}"
    );
}

/// Asserts two money values are equal after ledger rounding
pub fn assert_money_eq(left: Money, right: Money) {
    assert_eq!(left.currency(), right.currency(), "currency mismatch");
    assert_decimal_eq(left.round_ledger().amount(), right.round_ledger().amount());
}

/// Asserts an entry's derived status
pub fn assert_entry_status(entry: &LedgerEntry, expected: EntryStatus) {
    assert_eq!(
        entry.status, expected,
        "entry {} expected status {:?}, got {:?} (due {}, settled {:?})",
        entry.document_number, expected, entry.status, entry.due_date, entry.settlement_date
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_eq_ignores_scale() {
        assert_decimal_eq(dec!(10.5), dec!(10.50));
    }

    #[test]
    #[should_panic]
    fn test_decimal_eq_panics_on_difference() {
        assert_decimal_eq(dec!(10.5), dec!(10.51));
    }
}
