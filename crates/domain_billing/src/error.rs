//! Billing domain errors

use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// One or more field-level validation failures
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Workflow transition not allowed from the current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Closure requires an accounting classification that is not configured
    #[error("Accounting classification not configured: {0}")]
    MissingClassification(&'static str),

    /// Contractor consultant has no supplier to receive the payable
    #[error("Consultant has no supplier configured: {0}")]
    MissingSupplier(String),

    /// Closure references a client that was not loaded
    #[error("Client not loaded for closure: {0}")]
    UnknownClient(String),

    /// Rate lookup failure
    #[error(transparent)]
    Rate(#[from] domain_party::PartyError),

    /// Ledger-side failure while emitting entries
    #[error(transparent)]
    Ledger(#[from] domain_ledger::LedgerError),
}

impl BillingError {
    pub fn validation(issue: impl Into<String>) -> Self {
        BillingError::Validation(vec![issue.into()])
    }
}
