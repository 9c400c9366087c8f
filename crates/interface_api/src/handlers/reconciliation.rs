//! Reconciliation handlers
//!
//! Matching is validated by the domain matcher against candidates the
//! repository loads (amounts, directions, matched flags); only a
//! validated plan is persisted. Reversal deletes the link rows, which
//! by construction restores both sides to a re-matchable state.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{BankAccountId, MovementId, ReconciliationId, SettlementId, StatementEntryId};
use domain_reconciliation::Matcher;
use infra_db::ReconciliationRepository;

use crate::auth::{Claims, Role};
use crate::dto::reconciliation::{CreateReconciliationRequest, ReconciliationResponse};
use crate::handlers::party::ensure_bank_account;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> ReconciliationRepository {
    ReconciliationRepository::new(state.pool.clone())
}

/// Creates a reconciliation from system items and statement entries
///
/// Rejected with a validation error carrying both totals when the
/// signed sums differ.
pub async fn create_reconciliation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
    Json(request): Json<CreateReconciliationRequest>,
) -> Result<Json<ReconciliationResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let bank_account_id = BankAccountId::from(bank_account_id);
    ensure_bank_account(&state, bank_account_id).await?;

    let repository = repo(&state);

    let settlement_ids: Vec<SettlementId> = request
        .settlement_ids
        .iter()
        .map(|id| SettlementId::from(*id))
        .collect();
    let movement_ids: Vec<MovementId> = request
        .movement_ids
        .iter()
        .map(|id| MovementId::from(*id))
        .collect();
    let statement_ids: Vec<StatementEntryId> = request
        .statement_entry_ids
        .iter()
        .map(|id| StatementEntryId::from(*id))
        .collect();

    let system = repository
        .load_system_candidates(&settlement_ids, &movement_ids)
        .await?;
    let statement = repository.load_statement_candidates(&statement_ids).await?;

    let reconciliation = Matcher::plan(bank_account_id, &system, &statement)?;
    repository
        .insert_reconciliation(&reconciliation, &system, &statement)
        .await?;

    Ok(Json(reconciliation.into()))
}

/// Lists reconciliations for a bank account
pub async fn list_reconciliations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
) -> Result<Json<Vec<ReconciliationResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;

    let reconciliations = repo(&state)
        .list_reconciliations(BankAccountId::from(bank_account_id))
        .await?;
    Ok(Json(reconciliations.into_iter().map(Into::into).collect()))
}

/// Reverses a reconciliation
///
/// Removes the link only; settlements, movements and statement entries
/// survive and become matchable again.
pub async fn reverse_reconciliation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    claims.require_role(Role::Financial)?;

    repo(&state)
        .reverse_reconciliation(ReconciliationId::from(id))
        .await?;
    Ok(Json(serde_json::json!({ "reversed": id })))
}
