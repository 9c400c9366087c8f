//! Reconciliation matching
//!
//! A reconciliation links a set of system-side items (settlements and
//! manual movements) to a set of imported statement entries. The match
//! is permitted only when the signed totals of both sides are exactly
//! equal - no tolerance, no rounding. Matching marks both sides as
//! reconciled; reversal removes the link and restores both sides to an
//! unmatched, re-matchable state without deleting anything underneath.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BankAccountId, MovementId, ReconciliationId, SettlementId, StatementEntryId};
use crate::error::ReconciliationError;
use crate::import::Direction;

/// System-side item reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SystemItemRef {
    /// A payment or receipt on a ledger entry
    Settlement(SettlementId),
    /// A manual or mirrored bank movement
    Movement(MovementId),
}

impl std::fmt::Display for SystemItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemItemRef::Settlement(id) => write!(f, "{id}"),
            SystemItemRef::Movement(id) => write!(f, "{id}"),
        }
    }
}

/// A system-side item offered for matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCandidate {
    pub reference: SystemItemRef,
    pub bank_account_id: BankAccountId,
    /// Magnitude; direction carries the sign
    pub amount: Decimal,
    pub direction: Direction,
    /// True when already part of a live reconciliation
    pub matched: bool,
}

impl SystemCandidate {
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// A statement entry offered for matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementCandidate {
    pub entry_id: StatementEntryId,
    pub bank_account_id: BankAccountId,
    pub amount: Decimal,
    pub direction: Direction,
    pub matched: bool,
}

impl StatementCandidate {
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// A validated, ready-to-persist reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: ReconciliationId,
    pub bank_account_id: BankAccountId,
    pub total_system: Decimal,
    pub total_statement: Decimal,
    /// Always zero; stored for auditability
    pub difference: Decimal,
    pub system_items: Vec<SystemItemRef>,
    pub statement_entries: Vec<StatementEntryId>,
    pub created_at: DateTime<Utc>,
}

/// The items a reversal releases back to unmatched state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    pub system_items: Vec<SystemItemRef>,
    pub statement_entries: Vec<StatementEntryId>,
}

/// Validates and creates reconciliations
pub struct Matcher;

impl Matcher {
    /// Builds a reconciliation from both sides' candidates
    ///
    /// # Errors
    ///
    /// - [`ReconciliationError::EmptySide`] when either side is empty
    /// - [`ReconciliationError::AlreadyMatched`] when any candidate is
    ///   part of a live reconciliation
    /// - [`ReconciliationError::BankAccountMismatch`] when items span
    ///   bank accounts
    /// - [`ReconciliationError::UnbalancedMatch`] when the signed sums
    ///   differ; the error carries both totals and the difference
    pub fn plan(
        bank_account_id: BankAccountId,
        system: &[SystemCandidate],
        statement: &[StatementCandidate],
    ) -> Result<Reconciliation, ReconciliationError> {
        if system.is_empty() || statement.is_empty() {
            return Err(ReconciliationError::EmptySide);
        }

        for candidate in system {
            if candidate.matched {
                return Err(ReconciliationError::AlreadyMatched(
                    candidate.reference.to_string(),
                ));
            }
            if candidate.bank_account_id != bank_account_id {
                return Err(ReconciliationError::BankAccountMismatch(
                    candidate.reference.to_string(),
                ));
            }
        }
        for candidate in statement {
            if candidate.matched {
                return Err(ReconciliationError::AlreadyMatched(
                    candidate.entry_id.to_string(),
                ));
            }
            if candidate.bank_account_id != bank_account_id {
                return Err(ReconciliationError::BankAccountMismatch(
                    candidate.entry_id.to_string(),
                ));
            }
        }

        let total_system: Decimal = system.iter().map(|c| c.signed_amount()).sum();
        let total_statement: Decimal = statement.iter().map(|c| c.signed_amount()).sum();
        let difference = total_system - total_statement;

        if !difference.is_zero() {
            return Err(ReconciliationError::UnbalancedMatch {
                system: total_system,
                statement: total_statement,
                difference,
            });
        }

        tracing::debug!(
            bank_account = %bank_account_id,
            total = %total_system,
            system_items = system.len(),
            statement_entries = statement.len(),
            "reconciliation planned"
        );

        Ok(Reconciliation {
            id: ReconciliationId::new_v7(),
            bank_account_id,
            total_system,
            total_statement,
            difference: Decimal::ZERO,
            system_items: system.iter().map(|c| c.reference).collect(),
            statement_entries: statement.iter().map(|c| c.entry_id).collect(),
            created_at: Utc::now(),
        })
    }

    /// Lists the items a reversal releases
    ///
    /// Reversal deletes the reconciliation and its links only; the
    /// settlements, movements and statement entries themselves survive
    /// and become matchable again.
    pub fn reverse(reconciliation: &Reconciliation) -> MatchPlan {
        MatchPlan {
            system_items: reconciliation.system_items.clone(),
            statement_entries: reconciliation.statement_entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn system(
        account: BankAccountId,
        amount: Decimal,
        direction: Direction,
        matched: bool,
    ) -> SystemCandidate {
        SystemCandidate {
            reference: SystemItemRef::Settlement(SettlementId::new()),
            bank_account_id: account,
            amount,
            direction,
            matched,
        }
    }

    fn statement(
        account: BankAccountId,
        amount: Decimal,
        direction: Direction,
        matched: bool,
    ) -> StatementCandidate {
        StatementCandidate {
            entry_id: StatementEntryId::new(),
            bank_account_id: account,
            amount,
            direction,
            matched,
        }
    }

    #[test]
    fn test_equal_sums_match() {
        let account = BankAccountId::new();
        let reconciliation = Matcher::plan(
            account,
            &[
                system(account, dec!(100.00), Direction::Credit, false),
                system(account, dec!(50.00), Direction::Credit, false),
            ],
            &[statement(account, dec!(150.00), Direction::Credit, false)],
        )
        .unwrap();

        assert_eq!(reconciliation.total_system, dec!(150.00));
        assert_eq!(reconciliation.total_statement, dec!(150.00));
        assert!(reconciliation.difference.is_zero());
        assert_eq!(reconciliation.system_items.len(), 2);
        assert_eq!(reconciliation.statement_entries.len(), 1);
    }

    #[test]
    fn test_unequal_sums_rejected_with_both_totals() {
        let account = BankAccountId::new();
        let err = Matcher::plan(
            account,
            &[system(account, dec!(150.00), Direction::Credit, false)],
            &[statement(account, dec!(140.00), Direction::Credit, false)],
        )
        .unwrap_err();

        match err {
            ReconciliationError::UnbalancedMatch {
                system,
                statement,
                difference,
            } => {
                assert_eq!(system, dec!(150.00));
                assert_eq!(statement, dec!(140.00));
                assert_eq!(difference, dec!(10.00));
            }
            other => panic!("expected UnbalancedMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_signed_sums_mix_directions() {
        let account = BankAccountId::new();
        // Credit 200 and debit 50 on the system side nets to 150
        let result = Matcher::plan(
            account,
            &[
                system(account, dec!(200.00), Direction::Credit, false),
                system(account, dec!(50.00), Direction::Debit, false),
            ],
            &[statement(account, dec!(150.00), Direction::Credit, false)],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_side_rejected() {
        let account = BankAccountId::new();
        assert!(matches!(
            Matcher::plan(account, &[], &[statement(account, dec!(1), Direction::Credit, false)]),
            Err(ReconciliationError::EmptySide)
        ));
        assert!(matches!(
            Matcher::plan(account, &[system(account, dec!(1), Direction::Credit, false)], &[]),
            Err(ReconciliationError::EmptySide)
        ));
    }

    #[test]
    fn test_already_matched_rejected() {
        let account = BankAccountId::new();
        let err = Matcher::plan(
            account,
            &[system(account, dec!(10.00), Direction::Credit, true)],
            &[statement(account, dec!(10.00), Direction::Credit, false)],
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::AlreadyMatched(_)));
    }

    #[test]
    fn test_cross_account_items_rejected() {
        let account = BankAccountId::new();
        let other = BankAccountId::new();
        let err = Matcher::plan(
            account,
            &[system(other, dec!(10.00), Direction::Credit, false)],
            &[statement(account, dec!(10.00), Direction::Credit, false)],
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::BankAccountMismatch(_)));
    }

    #[test]
    fn test_reversal_releases_both_sides() {
        let account = BankAccountId::new();
        let reconciliation = Matcher::plan(
            account,
            &[system(account, dec!(10.00), Direction::Credit, false)],
            &[statement(account, dec!(10.00), Direction::Credit, false)],
        )
        .unwrap();

        let released = Matcher::reverse(&reconciliation);
        assert_eq!(released.system_items, reconciliation.system_items);
        assert_eq!(released.statement_entries, reconciliation.statement_entries);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_side(account: BankAccountId) -> impl Strategy<Value = Vec<SystemCandidate>> {
        proptest::collection::vec(
            (1i64..1_000_000, proptest::bool::ANY).prop_map(move |(cents, credit)| SystemCandidate {
                reference: SystemItemRef::Movement(MovementId::new()),
                bank_account_id: account,
                amount: Decimal::new(cents, 2),
                direction: if credit { Direction::Credit } else { Direction::Debit },
                matched: false,
            }),
            1..10,
        )
    }

    proptest! {
        /// A match succeeds iff the signed sums are exactly equal
        #[test]
        fn match_accepts_iff_sums_equal(side in arb_side(BankAccountId::from_uuid(uuid::Uuid::nil()))) {
            let account = BankAccountId::from_uuid(uuid::Uuid::nil());
            let total: Decimal = side.iter().map(|c| c.signed_amount()).sum();

            // Statement side mirroring the exact total always matches
            let mirrored = StatementCandidate {
                entry_id: StatementEntryId::new(),
                bank_account_id: account,
                amount: total.abs(),
                direction: if total.is_sign_negative() { Direction::Debit } else { Direction::Credit },
                matched: false,
            };
            prop_assert!(Matcher::plan(account, &side, &[mirrored.clone()]).is_ok());

            // Any shifted total must be rejected
            let shifted = StatementCandidate {
                amount: mirrored.amount + Decimal::new(1, 2),
                ..mirrored
            };
            let is_unbalanced = matches!(
                Matcher::plan(account, &side, &[shifted]),
                Err(ReconciliationError::UnbalancedMatch { .. })
            );
            prop_assert!(is_unbalanced);
        }
    }
}
