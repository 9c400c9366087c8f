//! Reconciliation domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the reconciliation domain
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// OFX text could not be parsed
    #[error("OFX parse error: {0}")]
    OfxParse(String),

    /// OFX transaction is missing a required tag
    #[error("OFX transaction {index}: missing {tag}")]
    OfxMissingTag { index: usize, tag: &'static str },

    /// OFX date could not be interpreted
    #[error("OFX transaction {index}: invalid date: {value}")]
    OfxInvalidDate { index: usize, value: String },

    /// OFX amount could not be interpreted
    #[error("OFX transaction {index}: invalid amount: {value}")]
    OfxInvalidAmount { index: usize, value: String },

    /// A match requires items on both sides
    #[error("Reconciliation requires at least one item on each side")]
    EmptySide,

    /// Item is already part of another reconciliation
    #[error("Already matched: {0}")]
    AlreadyMatched(String),

    /// Signed totals differ between the system and statement sides
    #[error("Totals differ: system {system} vs statement {statement} (difference {difference})")]
    UnbalancedMatch {
        system: Decimal,
        statement: Decimal,
        difference: Decimal,
    },

    /// Items belong to a different bank account
    #[error("Bank account mismatch: {0}")]
    BankAccountMismatch(String),

    /// Reconciliation not found
    #[error("Reconciliation not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Money arithmetic failure (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] core_kernel::MoneyError),
}
