//! Report handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use core_kernel::Period;
use domain_reports::DreAggregator;
use infra_db::ReportsRepository;

use crate::auth::{Claims, Role};
use crate::dto::reports::{DreQuery, DreResponse};
use crate::{error::ApiError, AppState};

/// Builds the DRE profit-and-loss statement for a period
pub async fn dre(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DreQuery>,
) -> Result<Json<DreResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let period = Period::new(query.start, query.end)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let rows = ReportsRepository::new(state.pool.clone())
        .dre_rows(period)
        .await?;
    let statement = DreAggregator::build(period, &rows);
    Ok(Json(statement.into()))
}
