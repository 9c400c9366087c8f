//! System movements
//!
//! A system movement is the ledger-side record of money moving through a
//! bank account outside the payable/receivable flow: bank fees, manual
//! transfers, or statement entries mirrored in during reconciliation.
//! Movements carry a chart-of-accounts classification so they feed the
//! DRE report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BankAccountId, ChartAccountId, Money, MovementId};
use crate::import::{Direction, StatementEntry};

/// Where the movement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementSource {
    Manual,
    Ofx,
}

/// A ledger-side bank movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMovement {
    pub id: MovementId,
    pub bank_account_id: BankAccountId,
    pub chart_account_id: Option<ChartAccountId>,
    pub movement_date: NaiveDate,
    pub description: String,
    /// Magnitude; direction carries the sign
    pub amount: Money,
    pub direction: Direction,
    pub source: MovementSource,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl SystemMovement {
    /// Creates a manual movement
    pub fn new(
        bank_account_id: BankAccountId,
        movement_date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        direction: Direction,
    ) -> Self {
        Self {
            id: MovementId::new_v7(),
            bank_account_id,
            chart_account_id: None,
            movement_date,
            description: description.into(),
            amount,
            direction,
            source: MovementSource::Manual,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Mirrors a statement entry as a classified system movement
    ///
    /// Date, amount and direction come from the statement; the caller
    /// assigns the accounting classification.
    pub fn from_statement_entry(
        entry: &StatementEntry,
        chart_account_id: ChartAccountId,
    ) -> Self {
        let description = if !entry.memo.is_empty() {
            entry.memo.clone()
        } else if !entry.name.is_empty() {
            entry.name.clone()
        } else {
            entry.fit_id.clone()
        };
        Self {
            id: MovementId::new_v7(),
            bank_account_id: entry.bank_account_id,
            chart_account_id: Some(chart_account_id),
            movement_date: entry.posted_at,
            description,
            amount: entry.amount,
            direction: entry.direction,
            source: MovementSource::Ofx,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_chart_account(mut self, id: ChartAccountId) -> Self {
        self.chart_account_id = Some(id);
        self
    }

    /// Signed amount (credits positive, debits negative)
    pub fn signed_amount(&self) -> rust_decimal::Decimal {
        self.direction.signed(self.amount.amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, StatementEntryId, StatementImportId};
    use rust_decimal_macros::dec;

    fn statement_entry(memo: &str, name: &str, fit_id: &str) -> StatementEntry {
        StatementEntry {
            id: StatementEntryId::new(),
            import_id: StatementImportId::new(),
            bank_account_id: BankAccountId::new(),
            posted_at: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            amount: Money::new(dec!(230.50), Currency::BRL),
            direction: Direction::Debit,
            fit_id: fit_id.to_string(),
            trn_type: "FEE".to_string(),
            name: name.to_string(),
            memo: memo.to_string(),
            check_number: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mirror_copies_date_amount_direction() {
        let entry = statement_entry("TARIFA BANCARIA", "", "F1");
        let movement = SystemMovement::from_statement_entry(&entry, ChartAccountId::new());

        assert_eq!(movement.movement_date, entry.posted_at);
        assert_eq!(movement.amount, entry.amount);
        assert_eq!(movement.direction, Direction::Debit);
        assert_eq!(movement.source, MovementSource::Ofx);
        assert_eq!(movement.description, "TARIFA BANCARIA");
        assert!(movement.chart_account_id.is_some());
    }

    #[test]
    fn test_mirror_description_falls_back_to_name_then_fitid() {
        let entry = statement_entry("", "TED ENVIADA", "F1");
        let movement = SystemMovement::from_statement_entry(&entry, ChartAccountId::new());
        assert_eq!(movement.description, "TED ENVIADA");

        let entry = statement_entry("", "", "F1");
        let movement = SystemMovement::from_statement_entry(&entry, ChartAccountId::new());
        assert_eq!(movement.description, "F1");
    }

    #[test]
    fn test_signed_amount_respects_direction() {
        let movement = SystemMovement::new(
            BankAccountId::new(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "Fee",
            Money::brl(dec!(50.00)),
            Direction::Debit,
        );
        assert_eq!(movement.signed_amount(), dec!(-50.00));
    }
}
