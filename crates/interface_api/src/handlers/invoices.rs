//! Invoice handlers
//!
//! Invoices are created by billing closure, never directly; this
//! surface reads them and runs the payment-status synchronization job.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::InvoiceId;
use infra_db::LedgerRepository;

use crate::auth::{Claims, Role};
use crate::dto::ledger::{InvoiceResponse, SyncPaymentStatusRequest, SyncPaymentStatusResponse};
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> LedgerRepository {
    LedgerRepository::new(state.pool.clone())
}

/// Lists invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;
    let invoices = repo(&state).list_invoices().await?;
    Ok(Json(invoices.into_iter().map(Into::into).collect()))
}

/// Gets one invoice with items
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    claims.require_role(Role::Financial)?;
    let invoice = repo(&state).get_invoice(InvoiceId::from(id)).await?;
    Ok(Json(invoice.into()))
}

/// Re-derives every invoice's payment status from its receivables
///
/// Dry-run by default; pass `commit: true` to apply.
pub async fn sync_payment_statuses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SyncPaymentStatusRequest>,
) -> Result<Json<SyncPaymentStatusResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let outcome = repo(&state)
        .sync_all_invoice_payment_statuses(request.commit)
        .await?;

    Ok(Json(SyncPaymentStatusResponse {
        total: outcome.total,
        updated: outcome.updated,
        unchanged: outcome.unchanged,
        committed: request.commit,
    }))
}
