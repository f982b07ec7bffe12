//! Expense category routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use forecourt_db::{
    ExpenseTypeRepository,
    entities::expense_types,
    repositories::{CreateExpenseTypeInput, UpdateExpenseTypeInput},
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

/// Creates the expense type routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expense-types", get(list_expense_types).post(create_expense_type))
        .route("/expense-types/{id}", get(get_expense_type).put(update_expense_type))
        .merge(lifecycle::routes::<expense_types::Entity>("/expense-types"))
}

/// Query filters for listing expense types.
#[derive(Debug, Default, Deserialize)]
pub struct ListExpenseTypesQuery {
    /// Children of this category.
    pub parent_id: Option<Uuid>,
}

/// Request body for creating an expense type.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseTypeRequest {
    /// Category name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,
    /// Parent category.
    pub parent_id: Option<Uuid>,
}

/// Request body for updating an expense type.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpenseTypeRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// New parent; `null` makes it a top-level category.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

async fn list_expense_types(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListExpenseTypesQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<expense_types::Model>>>> {
    let types = ExpenseTypeRepository::new((*state.db).clone())
        .list(query.parent_id, &page_request)
        .await?;
    Ok(page("Expense types retrieved", types))
}

async fn create_expense_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateExpenseTypeRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<expense_types::Model>>)> {
    let expense_type = ExpenseTypeRepository::new((*state.db).clone())
        .create(CreateExpenseTypeInput {
            name: payload.name,
            parent_id: payload.parent_id,
        })
        .await?;
    Ok(created("Expense type created", expense_type))
}

async fn get_expense_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<expense_types::Model>>> {
    let expense_type = ExpenseTypeRepository::new((*state.db).clone())
        .find(id)
        .await?;
    Ok(ok("Expense type retrieved", expense_type))
}

async fn update_expense_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateExpenseTypeRequest>,
) -> ApiResult<Json<ApiResponse<expense_types::Model>>> {
    let expense_type = ExpenseTypeRepository::new((*state.db).clone())
        .update(
            id,
            UpdateExpenseTypeInput {
                name: payload.name,
                parent_id: payload.parent_id,
            },
        )
        .await?;
    Ok(ok("Expense type updated", expense_type))
}
