//! Statement import and movement DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_reconciliation::{StatementEntry, SystemMovement};

#[derive(Debug, Deserialize)]
pub struct ImportStatementRequest {
    pub filename: String,
    /// Raw OFX file content (1.x SGML or 2.x XML)
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ImportStatementResponse {
    pub import_id: Uuid,
    pub imported: usize,
    pub duplicates: usize,
    pub statement_start: Option<NaiveDate>,
    pub statement_end: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct StatementEntryResponse {
    pub id: Uuid,
    pub posted_at: NaiveDate,
    pub amount: Decimal,
    pub direction: String,
    pub fit_id: String,
    pub trn_type: String,
    pub name: String,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

impl From<StatementEntry> for StatementEntryResponse {
    fn from(entry: StatementEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            posted_at: entry.posted_at,
            amount: entry.amount.amount(),
            direction: entry.direction.as_str().to_string(),
            fit_id: entry.fit_id,
            trn_type: entry.trn_type,
            name: entry.name,
            memo: entry.memo,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    #[serde(default)]
    pub unmatched_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateMovementRequest {
    pub movement_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    /// credit or debit
    pub direction: String,
    pub chart_account_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MirrorStatementEntryRequest {
    pub chart_account_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub chart_account_id: Option<Uuid>,
    pub movement_date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub direction: String,
    pub source: String,
}

impl From<SystemMovement> for MovementResponse {
    fn from(movement: SystemMovement) -> Self {
        Self {
            id: *movement.id.as_uuid(),
            bank_account_id: *movement.bank_account_id.as_uuid(),
            chart_account_id: movement.chart_account_id.map(|c| *c.as_uuid()),
            movement_date: movement.movement_date,
            description: movement.description,
            amount: movement.amount.amount(),
            direction: movement.direction.as_str().to_string(),
            source: match movement.source {
                domain_reconciliation::MovementSource::Manual => "manual".to_string(),
                domain_reconciliation::MovementSource::Ofx => "ofx".to_string(),
            },
        }
    }
}
