//! Account API handlers
//!
//! Handles endpoints related to account management:
//! - Create, update, get and cancel accounts
//! - List accounts, overall and per owner
//! - Deposit and withdraw funds

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::decimal::Amount;
use common::model::account::{Account, CreateAccountRequest, UpdateAccountRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::api::validation;
use crate::error::ApiError;
use crate::AppState;

/// Create a new account
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account successfully created", body = Account),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Account number already exists")
    ),
    tag = "account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, ApiResponse<Account>), ApiError> {
    validation::validate_create(&request)?;

    let account = state.account_service.create_account(request).await?;
    Ok((StatusCode::CREATED, ApiResponse::new(account)))
}

/// List all active accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Active accounts", body = [Account])
    ),
    tag = "account"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<ApiListResponse<Account>, ApiError> {
    let accounts = state.account_service.list_accounts().await?;
    Ok(ApiListResponse::new(accounts))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account details retrieved successfully", body = Account),
        (status = 404, description = "Account not found")
    ),
    tag = "account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Account>, ApiError> {
    let account = state.account_service.get_account(id).await?;
    Ok(ApiResponse::new(account))
}

/// Update an account
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = Account),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account number already exists")
    ),
    tag = "account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<ApiResponse<Account>, ApiError> {
    validation::validate_update(&request)?;

    let account = state.account_service.update_account(id, request).await?;
    Ok(ApiResponse::new(account))
}

/// Cancel (soft-delete) an account
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 204, description = "Account cancelled"),
        (status = 404, description = "Account not found")
    ),
    tag = "account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.account_service.delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the accounts of an owner, newest first
#[utoipa::path(
    get,
    path = "/api/v1/owners/{owner_id}/accounts",
    params(
        ("owner_id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Accounts of the owner", body = [Account])
    ),
    tag = "account"
)]
pub async fn list_owner_accounts(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<Uuid>,
) -> Result<ApiListResponse<Account>, ApiError> {
    let accounts = state.account_service.list_accounts_by_owner(owner_id).await?;
    Ok(ApiListResponse::new(accounts))
}

/// Whether an owner still holds accounts that are not cancelled
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OpenAccountsSummary {
    /// Owner ID
    pub owner_id: Uuid,
    /// True if any account of the owner is not cancelled
    pub has_open_accounts: bool,
}

/// Check whether an owner still holds open accounts
#[utoipa::path(
    get,
    path = "/api/v1/owners/{owner_id}/open-accounts",
    params(
        ("owner_id" = Uuid, Path, description = "Owner ID")
    ),
    responses(
        (status = 200, description = "Open account check", body = OpenAccountsSummary)
    ),
    tag = "account"
)]
pub async fn owner_open_accounts(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<Uuid>,
) -> Result<ApiResponse<OpenAccountsSummary>, ApiError> {
    let has_open_accounts = state.account_service.owner_has_open_accounts(owner_id).await?;
    Ok(ApiResponse::new(OpenAccountsSummary {
        owner_id,
        has_open_accounts,
    }))
}

/// Deposit or withdrawal request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AmountRequest {
    /// Amount, at most two decimal places
    #[schema(value_type = String, example = "100.00")]
    pub amount: Amount,
}

/// Deposit funds into an account
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/deposit",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Funds deposited successfully", body = Account),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account not active")
    ),
    tag = "account"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> Result<ApiResponse<Account>, ApiError> {
    validation::validate_amount(request.amount)?;
    debug!("Deposit request for {}: {}", id, request.amount);

    let account = state.account_service.deposit(id, request.amount).await?;
    Ok(ApiResponse::new(account))
}

/// Withdraw funds from an account
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Funds withdrawn successfully", body = Account),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account not active or insufficient balance")
    ),
    tag = "account"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AmountRequest>,
) -> Result<ApiResponse<Account>, ApiError> {
    validation::validate_amount(request.amount)?;
    debug!("Withdraw request for {}: {}", id, request.amount);

    let account = state.account_service.withdraw(id, request.amount).await?;
    Ok(ApiResponse::new(account))
}
