//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the consulting
//! back office, following the repository pattern: each domain gets a
//! repository that hides SQL behind domain-typed methods.
//!
//! Queries use SQLx's runtime-checked API (`query`/`query_as` with
//! `FromRow` row structs) so the workspace builds without a live
//! database. Multi-row mutations (statement imports, reconciliation
//! links, closure persistence) run inside a single transaction;
//! consistency beyond that is the database's per-request transactional
//! guarantee - there is no custom locking.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, LedgerRepository};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/consulting")).await?;
//! let ledger = LedgerRepository::new(pool.clone());
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{
    billing::BillingRepository, ledger::LedgerRepository, party::PartyRepository,
    reconciliation::ReconciliationRepository, reports::ReportsRepository,
};
