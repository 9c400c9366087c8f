//! Reconciliation Domain - Bank Statements and Matching
//!
//! This crate covers the path from a bank's OFX file to a reconciled
//! ledger:
//!
//! 1. **Parse** the OFX statement ([`ofx::OfxDocument::parse`]).
//! 2. **Import** its transactions, deduplicating against everything
//!    previously imported for the account by a composite signature
//!    ([`import::StatementImporter`]). Duplicates are skipped and
//!    counted, never errors; re-importing a file is a no-op.
//! 3. Optionally **mirror** statement entries as classified system
//!    movements ([`movement::SystemMovement`]).
//! 4. **Match** system-side money (settlements, movements) against
//!    statement entries. A match is permitted only when the signed
//!    totals of both sides are exactly equal; it is reversible, and
//!    reversal deletes nothing but the link
//!    ([`matcher::Matcher`]).

pub mod ofx;
pub mod import;
pub mod movement;
pub mod matcher;
pub mod error;

pub use ofx::{OfxDocument, OfxTransaction};
pub use import::{
    Direction, EntrySignature, ImportOutcome, StatementEntry, StatementImport, StatementImporter,
};
pub use movement::{MovementSource, SystemMovement};
pub use matcher::{Matcher, MatchPlan, Reconciliation, StatementCandidate, SystemCandidate, SystemItemRef};
pub use error::ReconciliationError;
