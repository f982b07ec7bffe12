//! Account management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use forecourt_db::{
    AccountRepository,
    entities::{accounts, sea_orm_active_enums::AccountKind},
    repositories::{AccountFilter, CreateAccountInput, UpdateAccountInput},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, double_option},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account).put(update_account))
        .merge(lifecycle::routes::<accounts::Entity>("/accounts"))
}

/// Query filters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by kind.
    pub kind: Option<AccountKind>,
    /// Filter by the `is_active` flag.
    pub is_active: Option<bool>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Account name, unique among existing accounts.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Free-form description.
    pub description: Option<String>,
    /// Whether the account accepts new activity (default: true).
    pub is_active: Option<bool>,
}

/// Request body for updating an account. Balance and kind are not editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// GET `/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<accounts::Model>>>> {
    let filter = AccountFilter {
        kind: query.kind,
        is_active: query.is_active,
    };
    let accounts = AccountRepository::new((*state.db).clone())
        .list(filter, &page_request)
        .await?;
    Ok(page("Accounts retrieved", accounts))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<accounts::Model>>)> {
    let account = AccountRepository::new((*state.db).clone())
        .create(CreateAccountInput {
            name: payload.name,
            kind: payload.kind,
            description: payload.description,
            is_active: payload.is_active.unwrap_or(true),
        })
        .await?;

    info!(
        account_id = %account.id,
        kind = ?account.kind,
        user_id = %auth.user_id(),
        "Account created"
    );
    Ok(created("Account created", account))
}

/// GET `/accounts/{id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<accounts::Model>>> {
    let account = AccountRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Account retrieved", account))
}

/// PUT `/accounts/{id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateAccountRequest>,
) -> ApiResult<Json<ApiResponse<accounts::Model>>> {
    let account = AccountRepository::new((*state.db).clone())
        .update(
            id,
            UpdateAccountInput {
                name: payload.name,
                description: payload.description,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(ok("Account updated", account))
}
