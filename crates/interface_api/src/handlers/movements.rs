//! System movement handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{BankAccountId, ChartAccountId, Money, StatementEntryId};
use domain_reconciliation::{Direction, SystemMovement};
use infra_db::{LedgerRepository, ReconciliationRepository};

use crate::auth::{Claims, Role};
use crate::dto::statements::{CreateMovementRequest, MirrorStatementEntryRequest, MovementResponse};
use crate::handlers::party::ensure_bank_account;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> ReconciliationRepository {
    ReconciliationRepository::new(state.pool.clone())
}

/// Records a manual bank movement
pub async fn create_movement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
    Json(request): Json<CreateMovementRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let bank_account_id = BankAccountId::from(bank_account_id);
    ensure_bank_account(&state, bank_account_id).await?;

    if request.amount.is_sign_negative() {
        return Err(ApiError::Validation(
            "amount: must not be negative; use direction instead".to_string(),
        ));
    }
    let direction = match request.direction.as_str() {
        "credit" => Direction::Credit,
        "debit" => Direction::Debit,
        other => {
            return Err(ApiError::Validation(format!(
                "direction: unknown value: {other}"
            )))
        }
    };

    let mut movement = SystemMovement::new(
        bank_account_id,
        request.movement_date,
        request.description,
        Money::brl(request.amount),
        direction,
    );
    if let Some(chart_account_id) = request.chart_account_id {
        LedgerRepository::new(state.pool.clone())
            .get_active_chart_account(ChartAccountId::from(chart_account_id))
            .await?;
        movement = movement.with_chart_account(ChartAccountId::from(chart_account_id));
    }
    if let Some(notes) = request.notes {
        movement.notes = notes;
    }

    repo(&state).insert_movement(&movement).await?;
    Ok(Json(movement.into()))
}

/// Mirrors a statement entry into a classified system movement
pub async fn mirror_statement_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(entry_id): Path<Uuid>,
    Json(request): Json<MirrorStatementEntryRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let repository = repo(&state);
    let entry = repository
        .get_statement_entry(StatementEntryId::from(entry_id))
        .await?;

    let chart_account_id = ChartAccountId::from(request.chart_account_id);
    LedgerRepository::new(state.pool.clone())
        .get_active_chart_account(chart_account_id)
        .await?;

    let movement = SystemMovement::from_statement_entry(&entry, chart_account_id);
    repository.insert_movement(&movement).await?;
    Ok(Json(movement.into()))
}

/// Lists movements for a bank account
pub async fn list_movements(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
) -> Result<Json<Vec<MovementResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;

    let movements = repo(&state)
        .list_movements(BankAccountId::from(bank_account_id))
        .await?;
    Ok(Json(movements.into_iter().map(Into::into).collect()))
}
