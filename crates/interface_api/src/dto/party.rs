//! Party DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_party::{Client, CompanyBankAccount, Consultant, Supplier};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub legal_name: String,
    #[validate(length(min = 1, max = 200))]
    pub trade_name: String,
    #[validate(length(min = 11, max = 18))]
    pub tax_id: String,
    pub payment_term_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub payment_term_days: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: *client.id.as_uuid(),
            legal_name: client.legal_name,
            trade_name: client.trade_name,
            tax_id: client.tax_id.to_string(),
            payment_term_days: client.payment_term_days,
            status: format!("{:?}", client.status).to_lowercase(),
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub legal_name: String,
    #[validate(length(min = 1, max = 200))]
    pub trade_name: String,
    #[validate(length(min = 11, max = 18))]
    pub tax_id: String,
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub legal_name: String,
    pub trade_name: String,
    pub tax_id: String,
    pub status: String,
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: *supplier.id.as_uuid(),
            legal_name: supplier.legal_name,
            trade_name: supplier.trade_name,
            tax_id: supplier.tax_id.to_string(),
            status: format!("{:?}", supplier.status).to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConsultantRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// "contractor" or "employee"
    pub consultant_type: String,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ConsultantResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub consultant_type: String,
    pub supplier_id: Option<Uuid>,
    pub status: String,
}

impl From<Consultant> for ConsultantResponse {
    fn from(consultant: Consultant) -> Self {
        Self {
            id: *consultant.id.as_uuid(),
            name: consultant.name,
            email: consultant.email,
            consultant_type: format!("{:?}", consultant.consultant_type).to_lowercase(),
            supplier_id: consultant.supplier_id.map(|s| *s.as_uuid()),
            status: format!("{:?}", consultant.status).to_lowercase(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRateRequest {
    pub effective_from: NaiveDate,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateBankAccountRequest {
    pub label: String,
    pub bank_code: String,
    pub branch: String,
    pub account_number: String,
}

#[derive(Debug, Serialize)]
pub struct BankAccountResponse {
    pub id: Uuid,
    pub label: String,
    pub bank_code: String,
    pub branch: String,
    pub account_number_masked: String,
    pub active: bool,
}

impl From<CompanyBankAccount> for BankAccountResponse {
    fn from(account: CompanyBankAccount) -> Self {
        Self {
            id: *account.id.as_uuid(),
            label: account.label.clone(),
            bank_code: account.bank_code.clone(),
            branch: account.branch.clone(),
            account_number_masked: account.masked_number(),
            active: account.active,
        }
    }
}
