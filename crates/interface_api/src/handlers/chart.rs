//! Chart-of-accounts handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use domain_ledger::ChartCsvImporter;
use infra_db::LedgerRepository;

use crate::auth::{Claims, Role};
use crate::dto::ledger::{ChartAccountResponse, ChartImportRequest, ChartImportResponse};
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> LedgerRepository {
    LedgerRepository::new(state.pool.clone())
}

/// Imports chart-of-accounts templates from a CSV export
///
/// All-or-nothing per file; the response lists the replaced templates.
pub async fn import_chart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ChartImportRequest>,
) -> Result<Json<ChartImportResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let outcome = ChartCsvImporter::import(request.csv.as_bytes())?;

    let repository = repo(&state);
    let mut templates: Vec<String> = Vec::with_capacity(outcome.templates.len());
    for template in outcome.templates.values() {
        repository.replace_chart_template(template).await?;
        templates.push(template.name.clone());
    }
    templates.sort();

    Ok(Json(ChartImportResponse {
        templates,
        imported: outcome.imported,
    }))
}

/// Lists the accounts of one template
pub async fn list_chart_accounts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(template): Path<String>,
) -> Result<Json<Vec<ChartAccountResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;

    let accounts = repo(&state).list_chart_accounts(&template).await?;
    Ok(Json(
        accounts
            .into_iter()
            .map(|account| ChartAccountResponse {
                id: *account.id.as_uuid(),
                code: account.code,
                description: account.description,
                level: account.level,
                parent_code: account.parent_code,
                account_type: format!("{:?}", account.account_type).to_lowercase(),
                nature: format!("{:?}", account.nature).to_lowercase(),
                is_analytic: account.is_analytic,
                dre_group: account.dre_group,
                dre_subgroup: account.dre_subgroup,
                dre_order: account.dre_order,
                dre_sign: format!("{:?}", account.dre_sign).to_lowercase(),
            })
            .collect(),
    ))
}
