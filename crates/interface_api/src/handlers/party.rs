//! Party handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{BankAccountId, ConsultantId, Money, SupplierId};
use domain_party::{
    Client, CompanyBankAccount, Consultant, ConsultantRate, ConsultantType, Supplier, TaxId,
};
use infra_db::PartyRepository;

use validator::Validate;

use crate::auth::{Claims, Role};
use crate::dto::party::*;
use crate::{error::ApiError, AppState};

fn repo(state: &AppState) -> PartyRepository {
    PartyRepository::new(state.pool.clone())
}

/// Registers a client
pub async fn create_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    claims.require_role(Role::Management)?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let tax_id = TaxId::parse(&request.tax_id)?;
    let mut client = Client::new(request.legal_name, request.trade_name, tax_id);
    if let Some(days) = request.payment_term_days {
        client = client.with_payment_term(days);
    }

    repo(&state).insert_client(&client).await?;
    Ok(Json(client.into()))
}

/// Lists clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = repo(&state).list_clients().await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

/// Registers a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateSupplierRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    claims.require_role(Role::Management)?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let tax_id = TaxId::parse(&request.tax_id)?;
    let supplier = Supplier::new(request.legal_name, request.trade_name, tax_id);
    repo(&state).insert_supplier(&supplier).await?;
    Ok(Json(supplier.into()))
}

/// Lists suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupplierResponse>>, ApiError> {
    let suppliers = repo(&state).list_suppliers().await?;
    Ok(Json(suppliers.into_iter().map(Into::into).collect()))
}

/// Registers a consultant
pub async fn create_consultant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateConsultantRequest>,
) -> Result<Json<ConsultantResponse>, ApiError> {
    claims.require_role(Role::Management)?;
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let consultant_type = match request.consultant_type.as_str() {
        "contractor" => ConsultantType::Contractor,
        "employee" => ConsultantType::Employee,
        other => {
            return Err(ApiError::Validation(format!(
                "consultant_type: unknown value: {other}"
            )))
        }
    };
    let mut consultant = Consultant::new(request.name, request.email, consultant_type);
    if let Some(supplier_id) = request.supplier_id {
        consultant = consultant.with_supplier(SupplierId::from(supplier_id));
    }

    repo(&state).insert_consultant(&consultant).await?;
    Ok(Json(consultant.into()))
}

/// Lists consultants
pub async fn list_consultants(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConsultantResponse>>, ApiError> {
    let consultants = repo(&state).list_consultants().await?;
    Ok(Json(consultants.into_iter().map(Into::into).collect()))
}

/// Records a new effective-dated rate for a consultant
pub async fn create_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(consultant_id): Path<Uuid>,
    Json(request): Json<CreateRateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    claims.require_role(Role::Management)?;

    if request.hourly_rate.is_sign_negative() {
        return Err(ApiError::Validation(
            "hourly_rate: must not be negative".to_string(),
        ));
    }

    let repository = repo(&state);
    // Ensure the consultant exists before attaching a rate
    repository
        .get_consultant(ConsultantId::from(consultant_id))
        .await?;

    let rate = ConsultantRate {
        consultant_id: ConsultantId::from(consultant_id),
        effective_from: request.effective_from,
        hourly_rate: Money::brl(request.hourly_rate),
    };
    repository.insert_rate(&rate).await?;
    Ok(Json(serde_json::json!({
        "consultant_id": consultant_id,
        "effective_from": request.effective_from,
        "hourly_rate": request.hourly_rate,
    })))
}

/// Registers a company bank account
pub async fn create_bank_account(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    claims.require_role(Role::Financial)?;

    let account = CompanyBankAccount::new(
        request.label,
        request.bank_code,
        request.branch,
        request.account_number,
    );
    repo(&state).insert_bank_account(&account).await?;
    Ok(Json(account.into()))
}

/// Lists company bank accounts
pub async fn list_bank_accounts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BankAccountResponse>>, ApiError> {
    claims.require_role(Role::Financial)?;
    let accounts = repo(&state).list_bank_accounts().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Shared guard used by statement and reconciliation handlers
pub(crate) async fn ensure_bank_account(
    state: &AppState,
    id: BankAccountId,
) -> Result<CompanyBankAccount, ApiError> {
    Ok(repo(state).get_bank_account(id).await?)
}
