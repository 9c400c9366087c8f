//! Core Kernel - Foundational types and utilities for the consulting back office
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Date periods for statements, billing closures, and reports
//! - Common identifiers and value objects

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Period, PeriodError};
pub use identifiers::{
    ClientId, SupplierId, ConsultantId, BankAccountId,
    EntryId, SettlementId, InvoiceId, InvoiceItemId, ChartAccountId,
    StatementImportId, StatementEntryId, MovementId, ReconciliationId,
    TimeRecordId, ProjectId, ActivityId,
};
pub use error::CoreError;
