//! Employee routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use forecourt_db::{
    EmployeeRepository,
    entities::employees,
    repositories::{CreateEmployeeInput, UpdateEmployeeInput},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, double_option, non_negative_money},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the employee routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).put(update_employee))
        .merge(lifecycle::routes::<employees::Entity>("/employees"))
}

/// Request body for creating an employee.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    /// Full name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,
    /// Job title.
    pub position: Option<String>,
    /// Pay per hour.
    #[validate(custom(function = "non_negative_money"))]
    pub hourly_rate: Decimal,
}

/// Request body for updating an employee.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// `null` clears the position.
    #[serde(default, deserialize_with = "double_option")]
    pub position: Option<Option<String>>,
    /// New hourly rate.
    #[validate(custom(function = "non_negative_money"))]
    pub hourly_rate: Option<Decimal>,
}

async fn list_employees(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<employees::Model>>>> {
    let employees = EmployeeRepository::new((*state.db).clone())
        .list(&page_request)
        .await?;
    Ok(page("Employees retrieved", employees))
}

async fn create_employee(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<employees::Model>>)> {
    let employee = EmployeeRepository::new((*state.db).clone())
        .create(CreateEmployeeInput {
            name: payload.name,
            position: payload.position,
            hourly_rate: payload.hourly_rate,
        })
        .await?;
    Ok(created("Employee created", employee))
}

async fn get_employee(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<employees::Model>>> {
    let employee = EmployeeRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Employee retrieved", employee))
}

async fn update_employee(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEmployeeRequest>,
) -> ApiResult<Json<ApiResponse<employees::Model>>> {
    let employee = EmployeeRepository::new((*state.db).clone())
        .update(
            id,
            UpdateEmployeeInput {
                name: payload.name,
                position: payload.position,
                hourly_rate: payload.hourly_rate,
            },
        )
        .await?;
    Ok(ok("Employee updated", employee))
}
