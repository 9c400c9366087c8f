//! Billing invoices
//!
//! An invoice aggregates the line items billed to a client for a period.
//! Its payment status is not stored state in its own right: it is derived
//! from the receivables financing the invoice and re-synchronized
//! whenever a receivable changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, ConsultantId, InvoiceId, InvoiceItemId, Money, Period, ProjectId};
use crate::entry::EntryStatus;

/// Invoice payment status, derived from linked receivables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoicePaymentStatus {
    Unpaid,
    Paid,
}

/// A billed line item: one consultant's hours at their effective rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub consultant_id: ConsultantId,
    pub description: String,
    pub hours: Decimal,
    pub hourly_rate: Money,
    pub total: Money,
}

impl InvoiceItem {
    pub fn new(
        consultant_id: ConsultantId,
        description: impl Into<String>,
        hours: Decimal,
        hourly_rate: Money,
    ) -> Self {
        let total = hourly_rate.multiply(hours).round_ledger();
        Self {
            id: InvoiceItemId::new_v7(),
            consultant_id,
            description: description.into(),
            hours,
            hourly_rate,
            total,
        }
    }
}

/// A billing invoice issued to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Unique human-readable number, e.g. FAT-202501-007
    pub number: String,
    pub client_id: ClientId,
    pub project_id: Option<ProjectId>,
    pub period: Period,
    pub total_hours: Decimal,
    pub total_value: Money,
    pub payment_status: InvoicePaymentStatus,
    pub items: Vec<InvoiceItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(number: impl Into<String>, client_id: ClientId, period: Period) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            number: number.into(),
            client_id,
            project_id: None,
            period,
            total_hours: Decimal::ZERO,
            total_value: Money::zero(Default::default()),
            payment_status: InvoicePaymentStatus::Unpaid,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Adds an item and refreshes the invoice totals
    pub fn add_item(&mut self, item: InvoiceItem) {
        self.items.push(item);
        self.recalculate_totals();
        self.updated_at = Utc::now();
    }

    fn recalculate_totals(&mut self) {
        self.total_hours = self.items.iter().map(|i| i.hours).sum();
        let currency = self
            .items
            .first()
            .map(|i| i.total.currency())
            .unwrap_or_default();
        self.total_value = self
            .items
            .iter()
            .fold(Money::zero(currency), |acc, i| acc + i.total);
    }
}

/// Derives the invoice payment status from its receivables' statuses
///
/// An invoice with no receivables is unpaid; an invoice is paid only
/// when every linked receivable is paid.
pub fn derive_payment_status(receivable_statuses: &[EntryStatus]) -> InvoicePaymentStatus {
    if receivable_statuses.is_empty() {
        return InvoicePaymentStatus::Unpaid;
    }
    let unpaid_exists = receivable_statuses
        .iter()
        .any(|s| *s != EntryStatus::Paid);
    if unpaid_exists {
        InvoicePaymentStatus::Unpaid
    } else {
        InvoicePaymentStatus::Paid
    }
}

/// Outcome of a bulk payment-status synchronization pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Bulk payment-status synchronization over invoices
///
/// Mirrors the periodic job that re-derives every invoice's payment
/// status from its receivables. In dry-run mode the outcome is counted
/// but no invoice is mutated.
pub struct PaymentStatusSync {
    commit: bool,
}

impl PaymentStatusSync {
    pub fn new(commit: bool) -> Self {
        Self { commit }
    }

    /// Runs the sync over (invoice, linked receivable statuses) pairs
    pub fn run(&self, invoices: &mut [(Invoice, Vec<EntryStatus>)]) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        for (invoice, statuses) in invoices.iter_mut() {
            outcome.total += 1;
            let new_status = derive_payment_status(statuses);
            if invoice.payment_status == new_status {
                outcome.unchanged += 1;
                continue;
            }
            outcome.updated += 1;
            if self.commit {
                invoice.payment_status = new_status;
                invoice.updated_at = Utc::now();
            }
        }
        outcome
    }
}
