//! Ledger Domain - Payables, Receivables and Invoices
//!
//! This crate implements the financial obligations of the back office:
//!
//! - **Ledger entries** are payable or receivable titles with amount,
//!   due date and discount/interest/penalty adjustments. Their status
//!   (open, overdue, paid, canceled) is a pure function of the entry's
//!   settlement and due dates, recomputed on every mutation — never set
//!   directly.
//! - **Settlements** record payments and receipts against an entry;
//!   once the settled total covers the entry total, the entry flips to
//!   paid.
//! - **Invoices** aggregate billed line items and derive their payment
//!   status from the linked receivables.
//! - The **chart of accounts** classifies entries and bank movements for
//!   DRE reporting, and can be imported from CSV templates.
//!
//! # Status rules
//!
//! ```text
//! canceled                      -> canceled (terminal)
//! settlement date present       -> paid
//! due date before today         -> overdue
//! previously overdue, now due   -> open
//! ```

pub mod entry;
pub mod settlement;
pub mod invoice;
pub mod chart;
pub mod error;

pub use entry::{LedgerEntry, EntryKind, EntryStatus, Counterparty, PaymentMethod};
pub use settlement::{Settlement, apply_settlements};
pub use invoice::{Invoice, InvoiceItem, InvoicePaymentStatus, derive_payment_status, PaymentStatusSync, SyncOutcome};
pub use chart::{
    ChartAccount, ChartTemplate, AccountType, AccountNature, AccountStatus, DreSign,
    ChartCsvImporter, ChartImportOutcome,
};
pub use error::LedgerError;
