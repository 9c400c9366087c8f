//! Ledger entries
//!
//! A ledger entry is a payable or receivable title: an obligation with a
//! due date, a face amount, and discount/interest/penalty adjustments.
//! Entries are never hard-deleted; cancellation is a terminal status.
//!
//! Status is derived, not assigned. Every mutation re-runs
//! [`LedgerEntry::sync_status`] so that persisted status always agrees
//! with the settlement and due dates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ChartAccountId, ClientId, ConsultantId, EntryId, InvoiceId, Money, SupplierId};
use crate::error::LedgerError;

/// Payable or receivable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Payable,
    Receivable,
}

/// Derived entry status
///
/// Paid takes precedence over overdue; canceled is terminal and excludes
/// the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Open,
    Overdue,
    Paid,
    Canceled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Open => "open",
            EntryStatus::Overdue => "overdue",
            EntryStatus::Paid => "paid",
            EntryStatus::Canceled => "canceled",
        }
    }
}

/// Payment instrument recorded on settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Transfer,
    Boleto,
    Card,
    Cash,
    Other,
}

/// The party on the other side of the obligation
///
/// Receivables are owed by clients; payables are owed to suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Counterparty {
    Client(ClientId),
    Supplier(SupplierId),
}

/// A payable or receivable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    /// Document number, unique per counterparty
    pub document_number: String,
    pub description: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub discount: Money,
    pub interest: Money,
    pub penalty: Money,
    pub status: EntryStatus,
    /// Date the entry was fully settled; presence implies paid
    pub settlement_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub counterparty: Counterparty,
    /// Consultant the payable originated from, when emitted by billing closure
    pub consultant_id: Option<ConsultantId>,
    /// Billing invoice this entry finances, when emitted by billing closure
    pub invoice_id: Option<InvoiceId>,
    /// Chart-of-accounts classification used by DRE reporting
    pub chart_account_id: Option<ChartAccountId>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an open entry dated today
    pub fn new(
        kind: EntryKind,
        document_number: impl Into<String>,
        description: impl Into<String>,
        counterparty: Counterparty,
        amount: Money,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let currency = amount.currency();
        Self {
            id: EntryId::new_v7(),
            kind,
            document_number: document_number.into(),
            description: description.into(),
            issue_date,
            due_date,
            amount,
            discount: Money::zero(currency),
            interest: Money::zero(currency),
            penalty: Money::zero(currency),
            status: EntryStatus::Open,
            settlement_date: None,
            payment_method: None,
            counterparty,
            consultant_id: None,
            invoice_id: None,
            chart_account_id: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_interest(mut self, interest: Money) -> Self {
        self.interest = interest;
        self
    }

    pub fn with_penalty(mut self, penalty: Money) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_chart_account(mut self, id: ChartAccountId) -> Self {
        self.chart_account_id = Some(id);
        self
    }

    pub fn with_invoice(mut self, id: InvoiceId) -> Self {
        self.invoice_id = Some(id);
        self
    }

    pub fn with_consultant(mut self, id: ConsultantId) -> Self {
        self.consultant_id = Some(id);
        self
    }

    /// Net amount due: amount - discount + interest + penalty,
    /// quantized to currency precision, half up
    pub fn total_amount(&self) -> Money {
        let total = self.amount - self.discount + self.interest + self.penalty;
        total.round_ledger()
    }

    /// Validates amounts, dates and counterparty coherence
    ///
    /// Collects every failure instead of stopping at the first one, so
    /// callers can surface the full list to the user.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut issues = Vec::new();

        if self.amount.is_negative() {
            issues.push("amount: must not be negative".to_string());
        }
        if self.discount.is_negative() {
            issues.push("discount: must not be negative".to_string());
        }
        if self.interest.is_negative() {
            issues.push("interest: must not be negative".to_string());
        }
        if self.penalty.is_negative() {
            issues.push("penalty: must not be negative".to_string());
        }
        if self.discount.amount() > self.amount.amount() {
            issues.push("discount: must not exceed the amount".to_string());
        }
        if self.due_date < self.issue_date {
            issues.push("due_date: must not precede the issue date".to_string());
        }
        if let Some(settled) = self.settlement_date {
            if settled < self.issue_date {
                issues.push("settlement_date: must not precede the issue date".to_string());
            }
        }
        if self.status == EntryStatus::Paid && self.settlement_date.is_none() {
            issues.push("settlement_date: required for paid entries".to_string());
        }
        if self.status == EntryStatus::Canceled && self.settlement_date.is_some() {
            issues.push("settlement_date: canceled entries cannot be settled".to_string());
        }

        let currency = self.amount.currency();
        for (field, money) in [
            ("discount", &self.discount),
            ("interest", &self.interest),
            ("penalty", &self.penalty),
        ] {
            if money.currency() != currency {
                issues.push(format!("{field}: currency differs from the amount"));
            }
        }

        match (self.kind, self.counterparty) {
            (EntryKind::Payable, Counterparty::Client(_)) => {
                issues.push("counterparty: payables are owed to suppliers".to_string());
            }
            (EntryKind::Receivable, Counterparty::Supplier(_)) => {
                issues.push("counterparty: receivables are owed by clients".to_string());
            }
            _ => {}
        }

        if self.document_number.trim().is_empty() {
            issues.push("document_number: required".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(issues))
        }
    }

    /// Recomputes status from (cancellation, settlement date, due date)
    ///
    /// Must run on every mutation. Canceled is terminal. A settled entry
    /// is paid regardless of due date. An unsettled entry past due is
    /// overdue; an overdue entry whose due date moved forward returns to
    /// open.
    pub fn sync_status(&mut self, today: NaiveDate) {
        if self.status == EntryStatus::Canceled {
            return;
        }
        if self.settlement_date.is_some() {
            self.status = EntryStatus::Paid;
            return;
        }
        if self.due_date < today {
            self.status = EntryStatus::Overdue;
        } else if self.status == EntryStatus::Overdue {
            self.status = EntryStatus::Open;
        }
    }

    /// Marks the entry settled on the given date
    ///
    /// Prefer registering settlements through
    /// [`crate::settlement::apply_settlements`], which calls this once
    /// the settled total covers the entry.
    pub fn mark_settled(
        &mut self,
        date: NaiveDate,
        method: Option<PaymentMethod>,
        today: NaiveDate,
    ) -> Result<(), LedgerError> {
        if self.status == EntryStatus::Canceled {
            return Err(LedgerError::InvalidState(
                "canceled entries cannot be settled".to_string(),
            ));
        }
        if date < self.issue_date {
            return Err(LedgerError::validation(
                "settlement_date: must not precede the issue date",
            ));
        }
        self.settlement_date = Some(date);
        if method.is_some() {
            self.payment_method = method;
        }
        self.touch(today);
        Ok(())
    }

    /// Cancels the entry
    ///
    /// Settled entries cannot be canceled; reverse the settlement first.
    pub fn cancel(&mut self, today: NaiveDate) -> Result<(), LedgerError> {
        if self.settlement_date.is_some() {
            return Err(LedgerError::InvalidState(
                "settled entries cannot be canceled".to_string(),
            ));
        }
        self.status = EntryStatus::Canceled;
        self.touch(today);
        Ok(())
    }

    /// Reschedules the due date, re-deriving status
    pub fn reschedule(&mut self, due_date: NaiveDate, today: NaiveDate) -> Result<(), LedgerError> {
        if due_date < self.issue_date {
            return Err(LedgerError::validation(
                "due_date: must not precede the issue date",
            ));
        }
        self.due_date = due_date;
        self.touch(today);
        Ok(())
    }

    fn touch(&mut self, today: NaiveDate) {
        self.sync_status(today);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn receivable(due: NaiveDate) -> LedgerEntry {
        LedgerEntry::new(
            EntryKind::Receivable,
            "NF-1001",
            "Consulting services",
            Counterparty::Client(ClientId::new()),
            Money::brl(dec!(1000.00)),
            date(2025, 1, 1),
            due,
        )
    }

    #[test]
    fn test_total_amount_combines_adjustments() {
        let entry = receivable(date(2025, 2, 1))
            .with_discount(Money::brl(dec!(50.00)))
            .with_interest(Money::brl(dec!(10.00)))
            .with_penalty(Money::brl(dec!(20.00)));

        assert_eq!(entry.total_amount().amount(), dec!(980.00));
    }

    #[test]
    fn test_total_amount_rounds_half_up() {
        let entry = receivable(date(2025, 2, 1)).with_interest(Money::brl(dec!(0.005)));
        assert_eq!(entry.total_amount().amount(), dec!(1000.01));
    }

    #[test]
    fn test_open_entry_becomes_overdue_past_due_date() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.sync_status(date(2025, 2, 2));
        assert_eq!(entry.status, EntryStatus::Overdue);
    }

    #[test]
    fn test_entry_not_overdue_on_due_date() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.sync_status(date(2025, 2, 1));
        assert_eq!(entry.status, EntryStatus::Open);
    }

    #[test]
    fn test_overdue_returns_to_open_after_reschedule() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.sync_status(date(2025, 2, 10));
        assert_eq!(entry.status, EntryStatus::Overdue);

        entry.reschedule(date(2025, 3, 1), date(2025, 2, 10)).unwrap();
        assert_eq!(entry.status, EntryStatus::Open);
    }

    #[test]
    fn test_settled_entry_is_paid_even_when_past_due() {
        let mut entry = receivable(date(2025, 2, 1));
        entry
            .mark_settled(date(2025, 2, 15), Some(PaymentMethod::Pix), date(2025, 3, 1))
            .unwrap();
        assert_eq!(entry.status, EntryStatus::Paid);
    }

    #[test]
    fn test_canceled_is_terminal() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.cancel(date(2025, 1, 10)).unwrap();

        entry.sync_status(date(2025, 3, 1));
        assert_eq!(entry.status, EntryStatus::Canceled);

        let err = entry
            .mark_settled(date(2025, 3, 1), None, date(2025, 3, 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
    }

    #[test]
    fn test_settled_entry_cannot_be_canceled() {
        let mut entry = receivable(date(2025, 2, 1));
        entry
            .mark_settled(date(2025, 1, 20), None, date(2025, 1, 20))
            .unwrap();
        assert!(entry.cancel(date(2025, 1, 21)).is_err());
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.amount = Money::brl(dec!(-1));
        entry.discount = Money::brl(dec!(5));
        entry.due_date = date(2024, 12, 1);

        let err = entry.validate().unwrap_err();
        match err {
            LedgerError::Validation(issues) => {
                assert!(issues.iter().any(|i| i.starts_with("amount:")));
                assert!(issues.iter().any(|i| i.starts_with("discount:")));
                assert!(issues.iter().any(|i| i.starts_with("due_date:")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_kind_counterparty_mismatch() {
        let mut entry = receivable(date(2025, 2, 1));
        entry.counterparty = Counterparty::Supplier(SupplierId::new());
        assert!(entry.validate().is_err());
    }
}
