//! Reconciliation DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_reconciliation::{Reconciliation, SystemItemRef};

#[derive(Debug, Deserialize)]
pub struct CreateReconciliationRequest {
    #[serde(default)]
    pub settlement_ids: Vec<Uuid>,
    #[serde(default)]
    pub movement_ids: Vec<Uuid>,
    pub statement_entry_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub total_system: Decimal,
    pub total_statement: Decimal,
    pub difference: Decimal,
    pub settlement_ids: Vec<Uuid>,
    pub movement_ids: Vec<Uuid>,
    pub statement_entry_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Reconciliation> for ReconciliationResponse {
    fn from(reconciliation: Reconciliation) -> Self {
        let mut settlement_ids = Vec::new();
        let mut movement_ids = Vec::new();
        for item in &reconciliation.system_items {
            match item {
                SystemItemRef::Settlement(id) => settlement_ids.push(*id.as_uuid()),
                SystemItemRef::Movement(id) => movement_ids.push(*id.as_uuid()),
            }
        }
        Self {
            id: *reconciliation.id.as_uuid(),
            bank_account_id: *reconciliation.bank_account_id.as_uuid(),
            total_system: reconciliation.total_system,
            total_statement: reconciliation.total_statement,
            difference: reconciliation.difference,
            settlement_ids,
            movement_ids,
            statement_entry_ids: reconciliation
                .statement_entries
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
            created_at: reconciliation.created_at,
        }
    }
}
