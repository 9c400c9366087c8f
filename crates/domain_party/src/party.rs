//! Client, supplier and consultant entities
//!
//! These are deliberately lean records: the interesting behavior lives in
//! the ledger and billing domains, which reference parties by id. What
//! belongs here is identity (tax id), activation status, and the
//! supplier link that lets a consultant be paid through a legal entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, ConsultantId, SupplierId};
use crate::tax_id::TaxId;

/// Activation status shared by all party records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    Active,
    Inactive,
}

impl PartyStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, PartyStatus::Active)
    }
}

/// How a consultant engages with the company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultantType {
    /// Contractor invoicing through their own legal entity
    Contractor,
    /// Employee on payroll
    Employee,
}

/// A client that is billed for project work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Registered legal name
    pub legal_name: String,
    /// Trade name used on invoices and screens
    pub trade_name: String,
    pub tax_id: TaxId,
    /// Payment term in days applied to receivables emitted by billing closure
    pub payment_term_days: u32,
    pub status: PartyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(legal_name: impl Into<String>, trade_name: impl Into<String>, tax_id: TaxId) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new_v7(),
            legal_name: legal_name.into(),
            trade_name: trade_name.into(),
            tax_id,
            payment_term_days: 30,
            status: PartyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_payment_term(mut self, days: u32) -> Self {
        self.payment_term_days = days;
        self
    }

    pub fn deactivate(&mut self) {
        self.status = PartyStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

/// A supplier that is paid through accounts payable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: TaxId,
    pub status: PartyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(legal_name: impl Into<String>, trade_name: impl Into<String>, tax_id: TaxId) -> Self {
        let now = Utc::now();
        Self {
            id: SupplierId::new_v7(),
            legal_name: legal_name.into(),
            trade_name: trade_name.into(),
            tax_id,
            status: PartyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self) {
        self.status = PartyStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

/// A consultant who records time against project activities
///
/// Contractors carry a supplier link; billing closure emits their
/// payables against that supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultant {
    pub id: ConsultantId,
    pub name: String,
    pub email: String,
    pub consultant_type: ConsultantType,
    /// Legal entity the consultant invoices through, when a contractor
    pub supplier_id: Option<SupplierId>,
    pub status: PartyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultant {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        consultant_type: ConsultantType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ConsultantId::new_v7(),
            name: name.into(),
            email: email.into(),
            consultant_type,
            supplier_id: None,
            status: PartyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn deactivate(&mut self) {
        self.status = PartyStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnpj() -> TaxId {
        TaxId::parse("11.222.333/0001-81").unwrap()
    }

    #[test]
    fn test_client_defaults() {
        let client = Client::new("Acme Ltda", "Acme", cnpj());
        assert_eq!(client.payment_term_days, 30);
        assert!(client.status.is_active());
    }

    #[test]
    fn test_client_payment_term_override() {
        let client = Client::new("Acme Ltda", "Acme", cnpj()).with_payment_term(45);
        assert_eq!(client.payment_term_days, 45);
    }

    #[test]
    fn test_consultant_supplier_link() {
        let supplier = Supplier::new("Dev Servicos ME", "Dev Servicos", cnpj());
        let consultant = Consultant::new("Ana Souza", "ana@example.com", ConsultantType::Contractor)
            .with_supplier(supplier.id);
        assert_eq!(consultant.supplier_id, Some(supplier.id));
    }

    #[test]
    fn test_deactivate() {
        let mut client = Client::new("Acme Ltda", "Acme", cnpj());
        client.deactivate();
        assert!(!client.status.is_active());
    }
}
