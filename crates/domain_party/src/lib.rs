//! Party Domain - Clients, Suppliers and Consultants
//!
//! This crate models the parties the back office transacts with:
//!
//! - **Clients** are billed for project work and carry receivables.
//! - **Suppliers** are paid and carry payables; consultants invoice the
//!   company through a supplier entity.
//! - **Consultants** record time against project activities and are paid
//!   according to effective-dated hourly rates.
//!
//! Brazilian tax identifiers (CPF for natural persons, CNPJ for legal
//! entities) are validated by check digit before a party is accepted.

pub mod party;
pub mod tax_id;
pub mod rate;
pub mod bank_account;
pub mod error;

pub use party::{Client, Supplier, Consultant, ConsultantType, PartyStatus};
pub use tax_id::TaxId;
pub use rate::{ConsultantRate, RateTable};
pub use bank_account::{CompanyBankAccount, BankHolderType};
pub use error::PartyError;
