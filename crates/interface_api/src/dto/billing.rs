//! Time record and billing closure DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_billing::TimeRecord;

#[derive(Debug, Deserialize)]
pub struct CreateTimeRecordRequest {
    pub activity_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub consultant_id: Uuid,
    /// "daily" or "weekly"
    pub kind: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Daily records
    pub hours: Option<Decimal>,
    /// Weekly records
    pub hours_monday: Option<Decimal>,
    pub hours_tuesday: Option<Decimal>,
    pub hours_wednesday: Option<Decimal>,
    pub hours_thursday: Option<Decimal>,
    pub hours_friday: Option<Decimal>,
    pub hours_saturday: Option<Decimal>,
    pub hours_sunday: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectTimeRecordRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct TimeRecordResponse {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub consultant_id: Uuid,
    pub kind: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: Decimal,
    pub description: String,
    pub rejection_reason: String,
    pub invoice_id: Option<Uuid>,
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<TimeRecord> for TimeRecordResponse {
    fn from(record: TimeRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            activity_id: *record.activity_id.as_uuid(),
            project_id: *record.project_id.as_uuid(),
            client_id: *record.client_id.as_uuid(),
            consultant_id: *record.consultant_id.as_uuid(),
            kind: format!("{:?}", record.kind).to_lowercase(),
            status: format!("{:?}", record.status).to_lowercase(),
            start_date: record.start_date,
            end_date: record.end_date,
            total_hours: record.total_hours,
            description: record.description,
            rejection_reason: record.rejection_reason,
            invoice_id: record.invoice_id.map(|i| *i.as_uuid()),
            invoice_number: record.invoice_number,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunClosureRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub client_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub consultant_id: Option<Uuid>,
    /// Revenue classification for the emitted receivables
    pub revenue_account_id: Option<Uuid>,
    /// Cost classification for the emitted payables
    pub cost_account_id: Option<Uuid>,
    /// Preview without persisting
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ClosureGroupResponse {
    pub invoice_id: Uuid,
    pub invoice_number: String,
    pub client_id: Uuid,
    pub consultant_ids: Vec<Uuid>,
    pub total_hours: Decimal,
    pub total_value: Decimal,
    pub receivable_id: Uuid,
    pub payable_id: Uuid,
    pub time_record_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RunClosureResponse {
    pub groups: Vec<ClosureGroupResponse>,
    pub total_billed: Decimal,
    pub dry_run: bool,
}
