//! Statement import handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::BankAccountId;
use domain_reconciliation::{OfxDocument, StatementImporter};
use infra_db::ReconciliationRepository;

use crate::auth::{Claims, Role};
use crate::dto::statements::*;
use crate::handlers::party::ensure_bank_account;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> ReconciliationRepository {
    ReconciliationRepository::new(state.pool.clone())
}

/// Imports an OFX statement for a bank account
///
/// Lines whose signature was already imported are skipped and counted;
/// re-importing the same file is a no-op.
pub async fn import_statement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
    Json(request): Json<ImportStatementRequest>,
) -> Result<Json<ImportStatementResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let bank_account_id = BankAccountId::from(bank_account_id);
    ensure_bank_account(&state, bank_account_id).await?;

    let document = OfxDocument::parse(&request.content)?;

    let repository = repo(&state);
    let known = repository.known_signatures(bank_account_id).await?;

    let mut importer = StatementImporter::new(bank_account_id, Default::default())
        .with_known_signatures(known);
    let outcome = importer.import(&document, request.filename)?;

    repository.insert_import(&outcome).await?;

    Ok(Json(ImportStatementResponse {
        import_id: *outcome.import.id.as_uuid(),
        imported: outcome.imported,
        duplicates: outcome.duplicates,
        statement_start: outcome.import.statement_start,
        statement_end: outcome.import.statement_end,
    }))
}

/// Lists statement entries for a bank account
pub async fn list_statement_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(bank_account_id): Path<Uuid>,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<StatementEntryResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;

    let entries = repo(&state)
        .list_statement_entries(BankAccountId::from(bank_account_id), query.unmatched_only)
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
