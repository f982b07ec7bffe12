//! Ledger transaction routes.
//!
//! Only manual transactions are created here. Safedrop and loan-payment
//! transactions come from their own endpoints and are read-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use forecourt_db::{
    TransactionRepository,
    entities::{
        sea_orm_active_enums::{TransactionOrigin, TransactionType},
        transactions,
    },
    repositories::{CreateTransactionInput, TransactionFilter},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, positive_money},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route("/transactions/{id}", get(get_transaction))
        .merge(lifecycle::routes::<transactions::Entity>("/transactions"))
}

/// Query filters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by type.
    pub transaction_type: Option<TransactionType>,
    /// Filter by origin.
    pub origin: Option<TransactionOrigin>,
    /// Transactions touching this account as source or target.
    pub account_id: Option<Uuid>,
    /// Payments of this loan.
    pub loan_id: Option<Uuid>,
    /// Filter by expense type.
    pub expense_type_id: Option<Uuid>,
    /// First transaction date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last transaction date (inclusive).
    pub to: Option<NaiveDate>,
}

/// Request body for a manual transaction.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    /// `income`, `expense` or `transfer`.
    pub transaction_type: TransactionType,
    /// Amount moved.
    #[validate(custom(function = "positive_money"))]
    pub amount: Decimal,
    /// Debited account (expense, transfer).
    pub source_account_id: Option<Uuid>,
    /// Credited account (income, transfer).
    pub target_account_id: Option<Uuid>,
    /// Description.
    #[validate(length(max = 1000, message = "The description may not exceed 1000 characters"))]
    pub description: Option<String>,
    /// External reference, e.g. a receipt number.
    #[validate(length(max = 64, message = "The reference number may not exceed 64 characters"))]
    pub reference_number: Option<String>,
    /// Defaults to today.
    pub transaction_date: Option<NaiveDate>,
    /// Expense category.
    pub expense_type_id: Option<Uuid>,
}

/// GET `/transactions` - List transactions.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<transactions::Model>>>> {
    let filter = TransactionFilter {
        transaction_type: query.transaction_type,
        origin: query.origin,
        account_id: query.account_id,
        loan_id: query.loan_id,
        expense_type_id: query.expense_type_id,
        from: query.from,
        to: query.to,
    };
    let transactions = TransactionRepository::new((*state.db).clone())
        .list(filter, &page_request)
        .await?;
    Ok(page("Transactions retrieved", transactions))
}

/// POST `/transactions` - Record a manual transaction.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<transactions::Model>>)> {
    let transaction = TransactionRepository::new((*state.db).clone())
        .create(CreateTransactionInput {
            transaction_type: payload.transaction_type,
            amount: payload.amount,
            source_account_id: payload.source_account_id,
            target_account_id: payload.target_account_id,
            description: payload.description,
            reference_number: payload.reference_number,
            transaction_date: payload
                .transaction_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            expense_type_id: payload.expense_type_id,
            created_by: Some(auth.user_id()),
        })
        .await?;

    info!(
        transaction_id = %transaction.id,
        transaction_type = ?transaction.transaction_type,
        amount = %transaction.amount,
        user_id = %auth.user_id(),
        "Transaction created"
    );
    Ok(created("Transaction created", transaction))
}

/// GET `/transactions/{id}` - Get a transaction.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<transactions::Model>>> {
    let transaction = TransactionRepository::new((*state.db).clone())
        .find(id)
        .await?;
    Ok(ok("Transaction retrieved", transaction))
}
