//! Loan repository and payment processing.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use forecourt_core::{
    ledger::{LOAN_PAYMENT_PREFIX, generate_reference},
    lifecycle::RecordStatus as CoreStatus,
    loan::{LoanPaymentOutcome, LoanPaymentType, apply_payment},
};
use forecourt_shared::types::{Currency, PageRequest, PageResponse, non_negative_amount};

use super::lifecycle::{RecordError, SoftDeletable, find, find_locked};
use super::query::{Sortable, paginate, scoped};
use crate::entities::{
    loans,
    sea_orm_active_enums::{RecordStatus, TransactionOrigin},
    transactions,
};

const SORTABLE: Sortable<loans::Column> = Sortable {
    columns: &[
        ("name", loans::Column::Name),
        ("amount", loans::Column::Amount),
        ("created_at", loans::Column::CreatedAt),
    ],
    default: "created_at",
    tie_breaker: loans::Column::Id,
};

#[async_trait]
impl SoftDeletable for loans::Entity {
    const RESOURCE: &'static str = "Loan";

    fn id_column() -> loans::Column {
        loans::Column::Id
    }
    fn status_column() -> loans::Column {
        loans::Column::Status
    }
    fn archived_at_column() -> loans::Column {
        loans::Column::ArchivedAt
    }
    fn updated_at_column() -> loans::Column {
        loans::Column::UpdatedAt
    }
    fn status_of(model: &loans::Model) -> CoreStatus {
        model.status.into()
    }

    async fn count_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        transactions::Entity::find()
            .filter(transactions::Column::LoanId.eq(id))
            .count(txn)
            .await
    }
}

/// Input for creating a loan.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// Display name.
    pub name: String,
    /// Loan currency.
    pub currency: Currency,
    /// Opening principal.
    pub amount: Decimal,
    /// Lender name.
    pub lender: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for updating a loan. The principal moves only through payments.
#[derive(Debug, Clone, Default)]
pub struct UpdateLoanInput {
    /// New name.
    pub name: Option<String>,
    /// New currency.
    pub currency: Option<Currency>,
    /// New lender; `Some(None)` clears it.
    pub lender: Option<Option<String>>,
    /// New notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// A payment against a loan.
#[derive(Debug, Clone)]
pub struct LoanPaymentInput {
    /// Positive amount.
    pub amount: Decimal,
    /// Deposit pays down, withdrawal draws more.
    pub payment_type: LoanPaymentType,
    /// Payment date.
    pub date: NaiveDate,
    /// Optional description for the mirrored transaction.
    pub description: Option<String>,
    /// Acting staff member.
    pub created_by: Option<Uuid>,
}

/// Rows written by a loan payment.
#[derive(Debug, Clone, Serialize)]
pub struct LoanPaymentResult {
    /// The loan after the payment.
    pub loan: loans::Model,
    /// The mirrored transaction.
    pub transaction: transactions::Model,
    /// Balance arithmetic of the payment.
    pub outcome: LoanPaymentOutcome,
}

/// Loan repository.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a loan.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a negative or sub-cent principal.
    pub async fn create(&self, input: CreateLoanInput) -> Result<loans::Model, RecordError> {
        non_negative_amount(input.amount)
            .map_err(|e| RecordError::invalid("amount", format!("The amount {e}")))?;

        let now = Utc::now().into();
        let loan = loans::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            currency: Set(input.currency.to_string()),
            amount: Set(input.amount),
            lender: Set(input.lender),
            notes: Set(input.notes),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(loan_id = %loan.id, amount = %loan.amount, currency = %loan.currency, "Loan created");
        Ok(loan)
    }

    /// Lists loans.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<loans::Model>, RecordError> {
        let query = scoped(loans::Entity::find(), loans::Column::Status, page.archive_scope());
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a loan by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no loan has the ID.
    pub async fn find(&self, id: Uuid) -> Result<loans::Model, RecordError> {
        find::<loans::Entity, _>(&self.db, id).await
    }

    /// Updates a loan's descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no loan has the ID.
    pub async fn update(&self, id: Uuid, input: UpdateLoanInput) -> Result<loans::Model, RecordError> {
        let loan = self.find(id).await?;

        let mut active: loans::ActiveModel = loan.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency.to_string());
        }
        if let Some(lender) = input.lender {
            active.lender = Set(lender);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Applies a payment to a loan and mirrors it into a transaction.
    ///
    /// The loan row is locked for the duration. A deposit larger than the
    /// outstanding balance clamps it to zero; the excess is reported as
    /// `overpayment` and the transaction records the full amount.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or archived loan and `Invalid` for a
    /// non-positive or sub-cent amount.
    pub async fn record_payment(
        &self,
        loan_id: Uuid,
        input: LoanPaymentInput,
    ) -> Result<LoanPaymentResult, RecordError> {
        let txn = self.db.begin().await?;

        let loan = find_locked::<loans::Entity>(&txn, loan_id).await?;
        if loan.status == RecordStatus::Archived {
            return Err(RecordError::not_found(loans::Entity::RESOURCE, loan_id));
        }

        let outcome = apply_payment(loan.amount, input.payment_type, input.amount)
            .map_err(|e| RecordError::invalid("amount", e.to_string()))?;

        let now = Utc::now().into();
        let reference = generate_reference(LOAN_PAYMENT_PREFIX, input.date);
        let description = input
            .description
            .unwrap_or_else(|| format!("Loan payment: {}", loan.name));

        let transaction = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_type: Set(outcome.transaction_type.into()),
            amount: Set(input.amount),
            source_account_id: Set(None),
            target_account_id: Set(None),
            description: Set(Some(description)),
            reference_number: Set(Some(reference.clone())),
            transaction_date: Set(input.date),
            origin: Set(TransactionOrigin::LoanPayment),
            loan_id: Set(Some(loan.id)),
            expense_type_id: Set(None),
            created_by: Set(input.created_by),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: loans::ActiveModel = loan.into();
        active.amount = Set(outcome.new_balance);
        active.updated_at = Set(now);
        let loan = active.update(&txn).await?;

        txn.commit().await?;

        if outcome.overpayment > Decimal::ZERO {
            warn!(%loan_id, overpayment = %outcome.overpayment, "Loan deposit exceeded the outstanding balance");
        }
        info!(
            %loan_id,
            amount = %input.amount,
            previous_balance = %outcome.previous_balance,
            new_balance = %outcome.new_balance,
            reference = %reference,
            "Loan payment recorded"
        );

        Ok(LoanPaymentResult {
            loan,
            transaction,
            outcome,
        })
    }
}
