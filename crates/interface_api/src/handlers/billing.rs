//! Time record and billing closure handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{
    ActivityId, ChartAccountId, ClientId, ConsultantId, Period, ProjectId, TimeRecordId,
};
use domain_billing::{
    ClosureAggregator, ClosureFilter, InvoiceNumberSequence, TimeRecord, WeekHours,
};
use infra_db::{BillingRepository, LedgerRepository, PartyRepository};

use crate::auth::{Claims, Role};
use crate::dto::billing::*;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> BillingRepository {
    BillingRepository::new(state.pool.clone())
}

#[derive(Debug, serde::Deserialize)]
pub struct ListTimeRecordsQuery {
    pub consultant_id: Option<Uuid>,
}

/// Creates a pending time record
pub async fn create_time_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateTimeRecordRequest>,
) -> Result<Json<TimeRecordResponse>, ApiError> {
    claims.require_role(Role::Consultant)?;

    let record = match request.kind.as_str() {
        "daily" => TimeRecord::daily(
            ActivityId::from(request.activity_id),
            ProjectId::from(request.project_id),
            ClientId::from(request.client_id),
            ConsultantId::from(request.consultant_id),
            request.start_date,
            request.hours.unwrap_or_default(),
        ),
        "weekly" => TimeRecord::weekly(
            ActivityId::from(request.activity_id),
            ProjectId::from(request.project_id),
            ClientId::from(request.client_id),
            ConsultantId::from(request.consultant_id),
            request.start_date,
            request.end_date.unwrap_or(request.start_date),
            WeekHours {
                monday: request.hours_monday,
                tuesday: request.hours_tuesday,
                wednesday: request.hours_wednesday,
                thursday: request.hours_thursday,
                friday: request.hours_friday,
                saturday: request.hours_saturday,
                sunday: request.hours_sunday,
            },
        ),
        other => {
            return Err(ApiError::Validation(format!(
                "kind: unknown value: {other}"
            )))
        }
    };
    let record = match request.description {
        Some(description) => record.with_description(description),
        None => record,
    };

    record.validate()?;
    repo(&state).insert_time_record(&record).await?;
    Ok(Json(record.into()))
}

/// Lists time records, optionally one consultant's
///
/// Any authenticated profile can list; consultants record, management
/// reviews, financial closes.
pub async fn list_time_records(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Query(query): Query<ListTimeRecordsQuery>,
) -> Result<Json<Vec<TimeRecordResponse>>, ApiError> {
    let records = repo(&state)
        .list_time_records(query.consultant_id.map(ConsultantId::from))
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Approves a pending time record
pub async fn approve_time_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TimeRecordResponse>, ApiError> {
    claims.require_role(Role::Management)?;

    let repository = repo(&state);
    let mut record = repository.get_time_record(TimeRecordId::from(id)).await?;
    record.approve(&claims.sub)?;
    repository.update_time_record(&record).await?;
    Ok(Json(record.into()))
}

/// Rejects a pending time record with a reason
pub async fn reject_time_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectTimeRecordRequest>,
) -> Result<Json<TimeRecordResponse>, ApiError> {
    claims.require_role(Role::Management)?;

    let repository = repo(&state);
    let mut record = repository.get_time_record(TimeRecordId::from(id)).await?;
    record.reject(&claims.sub, request.reason)?;
    repository.update_time_record(&record).await?;
    Ok(Json(record.into()))
}

/// Runs a billing closure over a period
///
/// Groups approved, unbilled records by client and consultant and emits
/// one invoice, one receivable and one payable per group. A run over a
/// period with nothing billable returns an empty result. Dry-run
/// previews without persisting.
pub async fn run_closure(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RunClosureRequest>,
) -> Result<Json<RunClosureResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let period = Period::new(request.period_start, request.period_end)
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    let mut filter = ClosureFilter::for_period(period);
    filter.client_id = request.client_id.map(ClientId::from);
    filter.project_id = request.project_id.map(ProjectId::from);
    filter.consultant_id = request.consultant_id.map(ConsultantId::from);

    let billing = repo(&state);
    let parties = PartyRepository::new(state.pool.clone());
    let ledger = LedgerRepository::new(state.pool.clone());

    let mut records = billing.load_billable_records(&filter).await?;
    let rates = parties.load_rate_table().await?;
    let clients: HashMap<ClientId, _> = parties
        .list_clients()
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let consultants: HashMap<ConsultantId, _> = parties
        .list_consultants()
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut aggregator = ClosureAggregator::new(&rates, &clients, &consultants);
    if let Some(id) = request.revenue_account_id {
        ledger
            .get_active_chart_account(ChartAccountId::from(id))
            .await?;
        aggregator = aggregator.with_revenue_account(ChartAccountId::from(id));
    }
    if let Some(id) = request.cost_account_id {
        ledger
            .get_active_chart_account(ChartAccountId::from(id))
            .await?;
        aggregator = aggregator.with_cost_account(ChartAccountId::from(id));
    }

    let today = Utc::now().date_naive();
    let year_month = request.period_end.format("%Y%m").to_string();
    let next = billing.next_invoice_sequence(&year_month).await?;
    let mut sequence = InvoiceNumberSequence::new(request.period_end, next);

    let outcome = aggregator.run(&filter, &mut records, &mut sequence, today)?;

    if !request.dry_run {
        for group in &outcome.groups {
            billing.persist_closure_group(group).await?;
        }
    }

    let total_billed = outcome.total_billed();
    Ok(Json(RunClosureResponse {
        groups: outcome
            .groups
            .into_iter()
            .map(|group| {
                let mut consultant_ids: Vec<Uuid> = group
                    .invoice
                    .items
                    .iter()
                    .map(|i| *i.consultant_id.as_uuid())
                    .collect();
                consultant_ids.dedup();
                ClosureGroupResponse {
                    invoice_id: *group.invoice.id.as_uuid(),
                    invoice_number: group.invoice.number.clone(),
                    client_id: *group.invoice.client_id.as_uuid(),
                    consultant_ids,
                    total_hours: group.invoice.total_hours,
                    total_value: group.invoice.total_value.amount(),
                    receivable_id: *group.receivable.id.as_uuid(),
                    payable_id: *group.payable.id.as_uuid(),
                    time_record_count: group.time_records.len(),
                }
            })
            .collect(),
        total_billed,
        dry_run: request.dry_run,
    }))
}
