//! Ledger DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_ledger::{Counterparty, EntryStatus, Invoice, LedgerEntry, PaymentMethod};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 60))]
    pub document_number: String,
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    /// Client for receivables, supplier for payables
    pub counterparty_id: Uuid,
    pub amount: Decimal,
    pub discount: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub penalty: Option<Decimal>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub chart_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreateSettlementRequest {
    pub bank_account_id: Uuid,
    pub date: NaiveDate,
    pub amount: Decimal,
    /// pix, transfer, boleto, card, cash, other
    pub method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub kind: String,
    pub document_number: String,
    pub description: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub discount: Decimal,
    pub interest: Decimal,
    pub penalty: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub settlement_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub counterparty_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub chart_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

pub fn payment_method_name(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Pix => "pix",
        PaymentMethod::Transfer => "transfer",
        PaymentMethod::Boleto => "boleto",
        PaymentMethod::Card => "card",
        PaymentMethod::Cash => "cash",
        PaymentMethod::Other => "other",
    }
}

pub fn parse_payment_method(value: &str) -> Option<PaymentMethod> {
    match value {
        "pix" => Some(PaymentMethod::Pix),
        "transfer" => Some(PaymentMethod::Transfer),
        "boleto" => Some(PaymentMethod::Boleto),
        "card" => Some(PaymentMethod::Card),
        "cash" => Some(PaymentMethod::Cash),
        "other" => Some(PaymentMethod::Other),
        _ => None,
    }
}

impl From<LedgerEntry> for EntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        let counterparty_id = match entry.counterparty {
            Counterparty::Client(id) => *id.as_uuid(),
            Counterparty::Supplier(id) => *id.as_uuid(),
        };
        Self {
            id: *entry.id.as_uuid(),
            kind: match entry.kind {
                domain_ledger::EntryKind::Payable => "payable".to_string(),
                domain_ledger::EntryKind::Receivable => "receivable".to_string(),
            },
            total_amount: entry.total_amount().amount(),
            document_number: entry.document_number,
            description: entry.description,
            issue_date: entry.issue_date,
            due_date: entry.due_date,
            amount: entry.amount.amount(),
            discount: entry.discount.amount(),
            interest: entry.interest.amount(),
            penalty: entry.penalty.amount(),
            currency: entry.amount.currency().code().to_string(),
            status: entry.status.as_str().to_string(),
            settlement_date: entry.settlement_date,
            payment_method: entry.payment_method.map(|m| payment_method_name(m).to_string()),
            counterparty_id,
            invoice_id: entry.invoice_id.map(|i| *i.as_uuid()),
            chart_account_id: entry.chart_account_id.map(|c| *c.as_uuid()),
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub bank_account_id: Uuid,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub method: Option<String>,
    /// Balance still due on the entry after this settlement
    pub remaining: Decimal,
    pub entry_status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// open, overdue, paid, canceled
    pub status: Option<String>,
}

pub fn parse_entry_status(value: &str) -> Option<EntryStatus> {
    match value {
        "open" => Some(EntryStatus::Open),
        "overdue" => Some(EntryStatus::Overdue),
        "paid" => Some(EntryStatus::Paid),
        "canceled" => Some(EntryStatus::Canceled),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceItemResponse {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub description: String,
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub number: String,
    pub client_id: Uuid,
    pub project_id: Option<Uuid>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_hours: Decimal,
    pub total_value: Decimal,
    pub payment_status: String,
    pub items: Vec<InvoiceItemResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            number: invoice.number,
            client_id: *invoice.client_id.as_uuid(),
            project_id: invoice.project_id.map(|p| *p.as_uuid()),
            period_start: invoice.period.start(),
            period_end: invoice.period.end(),
            total_hours: invoice.total_hours,
            total_value: invoice.total_value.amount(),
            payment_status: match invoice.payment_status {
                domain_ledger::InvoicePaymentStatus::Unpaid => "unpaid".to_string(),
                domain_ledger::InvoicePaymentStatus::Paid => "paid".to_string(),
            },
            items: invoice
                .items
                .into_iter()
                .map(|item| InvoiceItemResponse {
                    id: *item.id.as_uuid(),
                    consultant_id: *item.consultant_id.as_uuid(),
                    description: item.description,
                    hours: item.hours,
                    hourly_rate: item.hourly_rate.amount(),
                    total: item.total.amount(),
                })
                .collect(),
            created_at: invoice.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncPaymentStatusRequest {
    /// Dry-run when false
    #[serde(default)]
    pub commit: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncPaymentStatusResponse {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub committed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChartImportRequest {
    /// CSV content of the chart-of-accounts template export
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct ChartImportResponse {
    pub templates: Vec<String>,
    pub imported: usize,
}

#[derive(Debug, Serialize)]
pub struct ChartAccountResponse {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub level: u8,
    pub parent_code: Option<String>,
    pub account_type: String,
    pub nature: String,
    pub is_analytic: bool,
    pub dre_group: String,
    pub dre_subgroup: String,
    pub dre_order: u16,
    pub dre_sign: String,
}
