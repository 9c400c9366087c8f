//! Ledger entry handlers
//!
//! Payables and receivables share one implementation parameterized by
//! kind. Every mutation revalidates the entry and re-derives its status
//! before persisting, and settlement registration cascades to the
//! dependent invoice's payment status inside the repository
//! transaction.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::{BankAccountId, ChartAccountId, ClientId, EntryId, Money, SupplierId};
use domain_ledger::{
    apply_settlements, Counterparty, EntryKind, LedgerEntry, Settlement,
};
use infra_db::LedgerRepository;

use crate::auth::{Claims, Role};
use crate::dto::ledger::*;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> LedgerRepository {
    LedgerRepository::new(state.pool.clone())
}

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

async fn create_entry(
    state: AppState,
    claims: Claims,
    kind: EntryKind,
    request: CreateEntryRequest,
) -> Result<Json<EntryResponse>, ApiError> {
    claims.require_role(Role::Financial)?;
    validator::Validate::validate(&request).map_err(|e| ApiError::Validation(e.to_string()))?;

    let counterparty = match kind {
        EntryKind::Receivable => Counterparty::Client(ClientId::from(request.counterparty_id)),
        EntryKind::Payable => Counterparty::Supplier(SupplierId::from(request.counterparty_id)),
    };

    let mut entry = LedgerEntry::new(
        kind,
        request.document_number,
        request.description,
        counterparty,
        Money::brl(request.amount),
        request.issue_date,
        request.due_date,
    );
    if let Some(discount) = request.discount {
        entry = entry.with_discount(Money::brl(discount));
    }
    if let Some(interest) = request.interest {
        entry = entry.with_interest(Money::brl(interest));
    }
    if let Some(penalty) = request.penalty {
        entry = entry.with_penalty(Money::brl(penalty));
    }
    if let Some(chart_account_id) = request.chart_account_id {
        // Classifications must reference active analytic accounts
        repo(&state)
            .get_active_chart_account(ChartAccountId::from(chart_account_id))
            .await?;
        entry = entry.with_chart_account(ChartAccountId::from(chart_account_id));
    }
    if let Some(notes) = request.notes {
        entry.notes = notes;
    }

    entry.validate()?;
    entry.sync_status(today());

    repo(&state).insert_entry(&entry).await?;
    Ok(Json(entry.into()))
}

/// Creates a payable
pub async fn create_payable(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    create_entry(state, claims, EntryKind::Payable, request).await
}

/// Creates a receivable
pub async fn create_receivable(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    create_entry(state, claims, EntryKind::Receivable, request).await
}

async fn list_entries(
    state: AppState,
    claims: Claims,
    kind: EntryKind,
    query: ListEntriesQuery,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;

    let status = match query.status.as_deref() {
        Some(value) => Some(
            parse_entry_status(value)
                .ok_or_else(|| ApiError::Validation(format!("status: unknown value: {value}")))?,
        ),
        None => None,
    };

    let entries = repo(&state).list_entries(kind, status).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Lists payables
pub async fn list_payables(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    list_entries(state, claims, EntryKind::Payable, query).await
}

/// Lists receivables
pub async fn list_receivables(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    list_entries(state, claims, EntryKind::Receivable, query).await
}

/// Gets one entry
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    claims.require_role(Role::Financial)?;
    let entry = repo(&state).get_entry(EntryId::from(id)).await?;
    Ok(Json(entry.into()))
}

/// Registers a settlement against an entry
///
/// The entry flips to paid once the settled total covers its total
/// amount; the dependent invoice's payment status follows in the same
/// transaction.
pub async fn create_settlement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateSettlementRequest>,
) -> Result<Json<SettlementResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let repository = repo(&state);
    let entry_id = EntryId::from(id);
    let mut entry = repository.get_entry(entry_id).await?;

    let method = match request.method.as_deref() {
        Some(value) => Some(parse_payment_method(value).ok_or_else(|| {
            ApiError::Validation(format!("method: unknown value: {value}"))
        })?),
        None => None,
    };

    let mut settlement = Settlement::new(
        entry_id,
        BankAccountId::from(request.bank_account_id),
        request.date,
        Money::brl(request.amount),
    );
    if let Some(method) = method {
        settlement = settlement.with_method(method);
    }
    if let Some(notes) = request.notes {
        settlement.notes = notes;
    }

    let mut settlements = repository.list_settlements(entry_id).await?;
    settlements.push(settlement.clone());

    let remaining = apply_settlements(&mut entry, &settlements, today())?;
    repository.add_settlement(&settlement, &entry).await?;

    Ok(Json(SettlementResponse {
        id: *settlement.id.as_uuid(),
        entry_id: id,
        bank_account_id: request.bank_account_id,
        date: request.date,
        amount: request.amount,
        method: settlement.method.map(|m| payment_method_name(m).to_string()),
        remaining: remaining.amount().max(rust_decimal::Decimal::ZERO),
        entry_status: entry.status.as_str().to_string(),
    }))
}

/// Cancels an entry (terminal; settled entries cannot be canceled)
pub async fn cancel_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let repository = repo(&state);
    let mut entry = repository.get_entry(EntryId::from(id)).await?;
    entry.cancel(today())?;
    repository.update_entry(&entry).await?;
    Ok(Json(entry.into()))
}

/// Moves an entry's due date, re-deriving status
pub async fn reschedule_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let repository = repo(&state);
    let mut entry = repository.get_entry(EntryId::from(id)).await?;
    entry.reschedule(request.due_date, today())?;
    repository.update_entry(&entry).await?;
    Ok(Json(entry.into()))
}
