//! Settlements
//!
//! A settlement records money actually moving through a bank account
//! against a ledger entry: a receipt for a receivable, a payment for a
//! payable. Entries may be settled across several partial settlements;
//! the entry flips to paid once the settled total covers the entry's
//! total amount, carrying the latest settlement date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BankAccountId, EntryId, Money, SettlementId};
use crate::entry::{LedgerEntry, PaymentMethod};
use crate::error::LedgerError;

/// A payment or receipt against a ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub entry_id: EntryId,
    pub bank_account_id: BankAccountId,
    pub date: NaiveDate,
    pub amount: Money,
    pub method: Option<PaymentMethod>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        entry_id: EntryId,
        bank_account_id: BankAccountId,
        date: NaiveDate,
        amount: Money,
    ) -> Self {
        Self {
            id: SettlementId::new_v7(),
            entry_id,
            bank_account_id,
            date,
            amount,
            method: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Settlement amounts are strictly positive
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.amount.is_positive() {
            return Err(LedgerError::NonPositiveSettlement(self.amount.amount()));
        }
        Ok(())
    }
}

/// Applies the entry's settlements, flipping it to paid when covered
///
/// Validates every settlement, sums them, and when the total reaches the
/// entry's `total_amount()` marks the entry settled on the latest
/// settlement date with the latest settlement's method. Under-paid
/// entries keep their open/overdue status.
///
/// Returns the remaining balance (zero or negative once covered).
pub fn apply_settlements(
    entry: &mut LedgerEntry,
    settlements: &[Settlement],
    today: NaiveDate,
) -> Result<Money, LedgerError> {
    let currency = entry.amount.currency();
    let mut settled_total = Money::zero(currency);
    let mut latest: Option<&Settlement> = None;

    for settlement in settlements {
        settlement.validate()?;
        if settlement.entry_id != entry.id {
            return Err(LedgerError::validation(
                "settlement: does not belong to this entry",
            ));
        }
        settled_total = settled_total.checked_add(&settlement.amount)?;
        if latest.map_or(true, |l| settlement.date >= l.date) {
            latest = Some(settlement);
        }
    }

    let total_due = entry.total_amount();
    let remaining = total_due.checked_sub(&settled_total)?;

    if let Some(last) = latest {
        if !remaining.is_positive() {
            entry.mark_settled(last.date, last.method, today)?;
        }
    }
    if settlements.is_empty() && entry.settlement_date.is_some() {
        // All settlements reversed: reopen the entry
        entry.settlement_date = None;
        entry.sync_status(today);
    }

    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Counterparty, EntryKind, EntryStatus};
    use core_kernel::ClientId;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry() -> LedgerEntry {
        LedgerEntry::new(
            EntryKind::Receivable,
            "NF-42",
            "Services",
            Counterparty::Client(ClientId::new()),
            Money::brl(dec!(1000.00)),
            date(2025, 1, 1),
            date(2025, 2, 1),
        )
    }

    fn settlement(entry: &LedgerEntry, day: NaiveDate, amount: rust_decimal::Decimal) -> Settlement {
        Settlement::new(entry.id, BankAccountId::new(), day, Money::brl(amount))
    }

    #[test]
    fn test_partial_settlement_keeps_entry_open() {
        let mut e = entry();
        let s = settlement(&e, date(2025, 1, 10), dec!(400.00));

        let remaining = apply_settlements(&mut e, &[s], date(2025, 1, 10)).unwrap();
        assert_eq!(remaining.amount(), dec!(600.00));
        assert_eq!(e.status, EntryStatus::Open);
        assert!(e.settlement_date.is_none());
    }

    #[test]
    fn test_full_settlement_marks_paid_with_latest_date() {
        let mut e = entry();
        let first = settlement(&e, date(2025, 1, 10), dec!(400.00)).with_method(PaymentMethod::Pix);
        let second =
            settlement(&e, date(2025, 1, 20), dec!(600.00)).with_method(PaymentMethod::Transfer);

        let remaining =
            apply_settlements(&mut e, &[first, second], date(2025, 1, 20)).unwrap();
        assert!(remaining.is_zero());
        assert_eq!(e.status, EntryStatus::Paid);
        assert_eq!(e.settlement_date, Some(date(2025, 1, 20)));
        assert_eq!(e.payment_method, Some(PaymentMethod::Transfer));
    }

    #[test]
    fn test_zero_amount_settlement_rejected() {
        let mut e = entry();
        let s = settlement(&e, date(2025, 1, 10), dec!(0.00));
        assert!(matches!(
            apply_settlements(&mut e, &[s], date(2025, 1, 10)),
            Err(LedgerError::NonPositiveSettlement(_))
        ));
    }

    #[test]
    fn test_foreign_settlement_rejected() {
        let mut e = entry();
        let other = entry();
        let s = settlement(&other, date(2025, 1, 10), dec!(100.00));
        assert!(apply_settlements(&mut e, &[s], date(2025, 1, 10)).is_err());
    }

    #[test]
    fn test_reversing_all_settlements_reopens_entry() {
        let mut e = entry();
        let s = settlement(&e, date(2025, 1, 10), dec!(1000.00));
        apply_settlements(&mut e, &[s], date(2025, 1, 10)).unwrap();
        assert_eq!(e.status, EntryStatus::Paid);

        apply_settlements(&mut e, &[], date(2025, 3, 1)).unwrap();
        assert!(e.settlement_date.is_none());
        assert_eq!(e.status, EntryStatus::Overdue);
    }
}
