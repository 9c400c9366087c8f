//! Ledger domain errors

use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// One or more field-level validation failures
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Entry not found
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Operation not allowed in the entry's current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Settlement amount must be strictly positive
    #[error("Settlement amount must be greater than zero, got {0}")]
    NonPositiveSettlement(rust_decimal::Decimal),

    /// Money arithmetic failure (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] core_kernel::MoneyError),

    /// Chart account code not found within its template
    #[error("Chart account not found: {0}")]
    ChartAccountNotFound(String),

    /// Chart template CSV could not be imported
    #[error("Chart import failed: {}", .0.join("; "))]
    ChartImport(Vec<String>),
}

impl LedgerError {
    pub fn validation(issue: impl Into<String>) -> Self {
        LedgerError::Validation(vec![issue.into()])
    }
}
