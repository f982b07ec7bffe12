//! Loan routes and payment processing.

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

use forecourt_core::loan::LoanPaymentType;
use forecourt_db::{
    LoanRepository, TransactionRepository,
    entities::{loans, transactions},
    repositories::{
        CreateLoanInput, LoanPaymentInput, LoanPaymentResult, TransactionFilter, UpdateLoanInput,
    },
};
use forecourt_shared::types::{Currency, PageRequest};

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, double_option, non_negative_money, positive_money},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the loan routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/{id}", get(get_loan).put(update_loan))
        .route("/loans/{id}/payments", get(list_payments).post(record_payment))
        .merge(lifecycle::routes::<loans::Entity>("/loans"))
}

/// Request body for creating a loan.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    /// Loan name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: String,
    /// ISO currency code.
    pub currency: Currency,
    /// Opening balance.
    #[validate(custom(function = "non_negative_money"))]
    pub amount: Decimal,
    /// Lender.
    pub lender: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// Request body for updating a loan. The balance changes only through payments.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLoanRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "The name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// New currency.
    pub currency: Option<Currency>,
    /// `null` clears the lender.
    #[serde(default, deserialize_with = "double_option")]
    pub lender: Option<Option<String>>,
    /// `null` clears the notes.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Request body for a loan payment.
#[derive(Debug, Deserialize, Validate)]
pub struct LoanPaymentRequest {
    /// Amount paid or drawn.
    #[validate(custom(function = "positive_money"))]
    pub amount: Decimal,
    /// `deposit` pays the loan down, `withdrawal` draws more.
    #[serde(rename = "type")]
    pub payment_type: LoanPaymentType,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    /// Description of the mirrored transaction.
    pub description: Option<String>,
}

/// GET `/loans` - List loans.
async fn list_loans(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<loans::Model>>>> {
    let loans = LoanRepository::new((*state.db).clone())
        .list(&page_request)
        .await?;
    Ok(page("Loans retrieved", loans))
}

/// POST `/loans` - Create a loan.
async fn create_loan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateLoanRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<loans::Model>>)> {
    let loan = LoanRepository::new((*state.db).clone())
        .create(CreateLoanInput {
            name: payload.name,
            currency: payload.currency,
            amount: payload.amount,
            lender: payload.lender,
            notes: payload.notes,
        })
        .await?;

    info!(loan_id = %loan.id, amount = %loan.amount, user_id = %auth.user_id(), "Loan created");
    Ok(created("Loan created", loan))
}

/// GET `/loans/{id}` - Get a loan.
async fn get_loan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<loans::Model>>> {
    let loan = LoanRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Loan retrieved", loan))
}

/// PUT `/loans/{id}` - Update loan details.
async fn update_loan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateLoanRequest>,
) -> ApiResult<Json<ApiResponse<loans::Model>>> {
    let loan = LoanRepository::new((*state.db).clone())
        .update(
            id,
            UpdateLoanInput {
                name: payload.name,
                currency: payload.currency,
                lender: payload.lender,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(ok("Loan updated", loan))
}

/// GET `/loans/{id}/payments` - Transactions mirroring this loan's payments.
async fn list_payments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<transactions::Model>>>> {
    LoanRepository::new((*state.db).clone()).find(id).await?;
    let payments = TransactionRepository::new((*state.db).clone())
        .list(
            TransactionFilter {
                loan_id: Some(id),
                ..TransactionFilter::default()
            },
            &page_request,
        )
        .await?;
    Ok(page("Loan payments retrieved", payments))
}

/// POST `/loans/{id}/payments` - Record a deposit or withdrawal.
async fn record_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<LoanPaymentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<LoanPaymentResult>>)> {
    let result = LoanRepository::new((*state.db).clone())
        .record_payment(
            id,
            LoanPaymentInput {
                amount: payload.amount,
                payment_type: payload.payment_type,
                date: payload.date.unwrap_or_else(|| Utc::now().date_naive()),
                description: payload.description,
                created_by: Some(auth.user_id()),
            },
        )
        .await?;

    let message = if result.outcome.overpayment.is_zero() {
        "Loan payment recorded".to_string()
    } else {
        format!(
            "Loan payment recorded; {} exceeded the outstanding balance",
            result.outcome.overpayment
        )
    };
    Ok(created(message, result))
}
