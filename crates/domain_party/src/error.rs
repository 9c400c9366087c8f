//! Party domain errors

use thiserror::Error;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Tax identifier failed structural or check-digit validation
    #[error("Invalid tax id: {0}")]
    InvalidTaxId(String),

    /// Party not found
    #[error("Party not found: {0}")]
    PartyNotFound(String),

    /// Consultant has no rate effective on the requested date
    #[error("No rate effective on {date} for consultant {consultant}")]
    NoEffectiveRate { consultant: String, date: String },

    /// Duplicate rate for the same effective date
    #[error("Rate already exists for consultant {consultant} effective {date}")]
    DuplicateRate { consultant: String, date: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}
