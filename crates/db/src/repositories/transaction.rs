//! Ledger transaction repository.
//!
//! Manual transactions move account balances when created, archived,
//! restored or purged. Transactions generated by safedrop resolutions and
//! loan payments belong to the record that produced them and reject every
//! lifecycle change.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use forecourt_core::{
    ledger::{
        BalanceEffect, LedgerError, TransactionAccounts, TransactionOrigin as CoreOrigin,
        TransactionType as CoreType, reversed,
    },
    lifecycle::{LifecycleAction, RecordStatus as CoreStatus},
};
use forecourt_shared::types::{PageRequest, PageResponse};

use super::account::{apply_effects, is_usable};
use super::lifecycle::{RecordError, SoftDeletable, find, find_active};
use super::query::{Sortable, paginate, scoped};
use crate::entities::{
    accounts, expense_types,
    sea_orm_active_enums::{RecordStatus, TransactionOrigin, TransactionType},
    transactions,
};

const SORTABLE: Sortable<transactions::Column> = Sortable {
    columns: &[
        ("transaction_date", transactions::Column::TransactionDate),
        ("amount", transactions::Column::Amount),
        ("created_at", transactions::Column::CreatedAt),
    ],
    default: "transaction_date",
    tie_breaker: transactions::Column::Id,
};

/// Balance effects of a stored transaction.
fn effects_of(model: &transactions::Model) -> Vec<BalanceEffect> {
    CoreType::from(model.transaction_type).balance_effects(
        model.amount,
        TransactionAccounts {
            source: model.source_account_id,
            target: model.target_account_id,
        },
    )
}

fn ledger_error(err: &LedgerError) -> RecordError {
    RecordError::invalid(err.field(), err.to_string())
}

#[async_trait]
impl SoftDeletable for transactions::Entity {
    const RESOURCE: &'static str = "Transaction";

    fn id_column() -> transactions::Column {
        transactions::Column::Id
    }
    fn status_column() -> transactions::Column {
        transactions::Column::Status
    }
    fn archived_at_column() -> transactions::Column {
        transactions::Column::ArchivedAt
    }
    fn updated_at_column() -> transactions::Column {
        transactions::Column::UpdatedAt
    }
    fn status_of(model: &transactions::Model) -> CoreStatus {
        model.status.into()
    }

    async fn on_transition(
        txn: &DatabaseTransaction,
        model: &transactions::Model,
        action: LifecycleAction,
    ) -> Result<(), RecordError> {
        if !CoreOrigin::from(model.origin).is_user_managed() {
            return Err(ledger_error(&LedgerError::NotUserManaged));
        }

        let effects = effects_of(model);
        let settled = model.status == RecordStatus::Active;
        match action {
            LifecycleAction::Archive => apply_effects(txn, &reversed(&effects)).await?,
            LifecycleAction::Restore => {
                for (field, id) in [
                    ("source_account_id", model.source_account_id),
                    ("target_account_id", model.target_account_id),
                ] {
                    if let Some(id) = id {
                        ensure_account_usable(txn, field, id).await?;
                    }
                }
                apply_effects(txn, &effects).await?;
            }
            LifecycleAction::Purge if settled => apply_effects(txn, &reversed(&effects)).await?,
            LifecycleAction::Purge => {}
        }
        Ok(())
    }
}

/// Input for recording a manual transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Income, expense or transfer.
    pub transaction_type: TransactionType,
    /// Positive amount.
    pub amount: Decimal,
    /// Account money leaves.
    pub source_account_id: Option<Uuid>,
    /// Account money enters.
    pub target_account_id: Option<Uuid>,
    /// Free-text description.
    pub description: Option<String>,
    /// External reference (invoice, cheque number).
    pub reference_number: Option<String>,
    /// Booking date.
    pub transaction_date: NaiveDate,
    /// Optional expense classification.
    pub expense_type_id: Option<Uuid>,
    /// Acting staff member.
    pub created_by: Option<Uuid>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by type.
    pub transaction_type: Option<TransactionType>,
    /// Filter by origin.
    pub origin: Option<TransactionOrigin>,
    /// Transactions touching this account on either side.
    pub account_id: Option<Uuid>,
    /// Filter by loan.
    pub loan_id: Option<Uuid>,
    /// Filter by expense type.
    pub expense_type_id: Option<Uuid>,
    /// Earliest transaction date.
    pub from: Option<NaiveDate>,
    /// Latest transaction date.
    pub to: Option<NaiveDate>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a manual transaction and applies its balance effects.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` when the amount or account references do not fit the
    /// transaction type, or when a referenced record is unavailable.
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, RecordError> {
        let kind = CoreType::from(input.transaction_type);
        let accounts = TransactionAccounts {
            source: input.source_account_id,
            target: input.target_account_id,
        };
        kind.validate_manual(input.amount, accounts)
            .map_err(|e| ledger_error(&e))?;

        let txn = self.db.begin().await?;

        for (field, id) in [
            ("source_account_id", accounts.source),
            ("target_account_id", accounts.target),
        ] {
            if let Some(id) = id {
                ensure_account_usable(&txn, field, id).await?;
            }
        }
        if let Some(id) = input.expense_type_id {
            find_active::<expense_types::Entity, _>(&txn, id)
                .await
                .map_err(|_| RecordError::invalid("expense_type_id", "The selected expense type is invalid"))?;
        }

        let now = Utc::now().into();
        let transaction = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_type: Set(input.transaction_type),
            amount: Set(input.amount),
            source_account_id: Set(accounts.source),
            target_account_id: Set(accounts.target),
            description: Set(input.description),
            reference_number: Set(input.reference_number),
            transaction_date: Set(input.transaction_date),
            origin: Set(TransactionOrigin::Manual),
            loan_id: Set(None),
            expense_type_id: Set(input.expense_type_id),
            created_by: Set(input.created_by),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        apply_effects(&txn, &effects_of(&transaction)).await?;
        txn.commit().await?;

        info!(
            transaction_id = %transaction.id,
            transaction_type = kind.as_str(),
            amount = %transaction.amount,
            "Transaction recorded"
        );
        Ok(transaction)
    }

    /// Lists transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<transactions::Model>, RecordError> {
        let mut query = scoped(
            transactions::Entity::find(),
            transactions::Column::Status,
            page.archive_scope(),
        );
        if let Some(kind) = filter.transaction_type {
            query = query.filter(transactions::Column::TransactionType.eq(kind));
        }
        if let Some(origin) = filter.origin {
            query = query.filter(transactions::Column::Origin.eq(origin));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::SourceAccountId.eq(account_id))
                    .add(transactions::Column::TargetAccountId.eq(account_id)),
            );
        }
        if let Some(loan_id) = filter.loan_id {
            query = query.filter(transactions::Column::LoanId.eq(loan_id));
        }
        if let Some(expense_type_id) = filter.expense_type_id {
            query = query.filter(transactions::Column::ExpenseTypeId.eq(expense_type_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }

        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no transaction has the ID.
    pub async fn find(&self, id: Uuid) -> Result<transactions::Model, RecordError> {
        find::<transactions::Entity, _>(&self.db, id).await
    }
}

async fn ensure_account_usable<C: ConnectionTrait>(
    db: &C,
    field: &'static str,
    id: Uuid,
) -> Result<(), RecordError> {
    let usable = accounts::Entity::find_by_id(id)
        .one(db)
        .await?
        .as_ref()
        .is_some_and(is_usable);
    if usable {
        Ok(())
    } else {
        Err(RecordError::invalid(field, "The selected account is invalid or inactive"))
    }
}
