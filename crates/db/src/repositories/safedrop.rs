//! Safedrop resolutions: moving a day's declared cash into a bank account.
//!
//! A resolution writes three things in one database transaction: the
//! append-only resolution row, a mirrored `transfer` transaction, and the
//! balance changes on the cash and target accounts. The daily sale is locked
//! first, then both accounts in ascending id order, so two concurrent
//! resolutions against the same sale are serialised and the remaining amount
//! is always computed from committed data.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use forecourt_core::{
    ledger::{SAFEDROP_PREFIX, generate_reference},
    safedrop::{
        SafedropError, SafedropPosition, SafedropService, SafedropTransfer, SettlementState,
    },
};
use forecourt_shared::AppError;

use super::account::{apply_effects, find_cash_account, is_usable_cash};
use super::lifecycle::{RecordError, find, find_locked};
use super::query::for_update;
use crate::entities::{
    accounts, daily_sales, safedrop_resolutions,
    sea_orm_active_enums::{
        AccountKind, RecordStatus, ResolutionType, TransactionOrigin, TransactionType,
    },
    transactions,
};

/// Errors raised while resolving safedrops.
#[derive(Debug, thiserror::Error)]
pub enum SafedropRepoError {
    /// Resolution rejected by a business rule.
    #[error(transparent)]
    Rule(#[from] SafedropError),

    /// There is no active cash account to take the money from.
    #[error("No active cash account is configured")]
    NoCashAccount,

    /// Lookup or database failure.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<DbErr> for SafedropRepoError {
    fn from(err: DbErr) -> Self {
        Self::Record(RecordError::Database(err))
    }
}

impl From<SafedropRepoError> for AppError {
    fn from(err: SafedropRepoError) -> Self {
        match err {
            SafedropRepoError::Rule(rule) => Self::validation(rule.field(), rule.to_string()),
            SafedropRepoError::NoCashAccount => Self::BusinessRule(err.to_string()),
            SafedropRepoError::Record(record) => record.into(),
        }
    }
}

/// Input for resolving part of a day's safedrop.
#[derive(Debug, Clone)]
pub struct ResolveSafedropInput {
    /// Daily sale whose safedrop is resolved.
    pub daily_sale_id: Uuid,
    /// Account receiving the cash.
    pub target_account_id: Uuid,
    /// Amount moved.
    pub amount: Decimal,
    /// Optional note.
    pub note: Option<String>,
    /// Acting staff member.
    pub created_by: Uuid,
}

/// Rows written by a resolution and the sale's position afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSafedrop {
    /// The resolution row.
    pub resolution: safedrop_resolutions::Model,
    /// The mirrored transfer.
    pub transaction: transactions::Model,
    /// Resolved total after this resolution.
    pub resolved_total: Decimal,
    /// Amount still unresolved.
    pub remaining: Decimal,
    /// Settlement state.
    pub state: SettlementState,
}

/// All resolutions of one daily sale.
#[derive(Debug, Clone, Serialize)]
pub struct SafedropSummary {
    /// Daily sale ID.
    pub daily_sale_id: Uuid,
    /// Declared safedrop amount.
    pub safedrops_amount: Decimal,
    /// Sum of resolutions.
    pub resolved_total: Decimal,
    /// Amount still unresolved.
    pub remaining: Decimal,
    /// Settlement state.
    pub state: SettlementState,
    /// Resolutions, oldest first.
    pub resolutions: Vec<safedrop_resolutions::Model>,
}

/// A daily sale with unresolved safedrop cash.
#[derive(Debug, Clone, Serialize)]
pub struct PendingSafedrop {
    /// Daily sale ID.
    pub daily_sale_id: Uuid,
    /// Business day.
    pub sale_date: NaiveDate,
    /// Declared safedrop amount.
    pub safedrops_amount: Decimal,
    /// Sum of resolutions.
    pub resolved_total: Decimal,
    /// Amount still unresolved.
    pub remaining: Decimal,
    /// `pending` or `partial`.
    pub state: SettlementState,
}

/// Safedrop resolution repository.
#[derive(Debug, Clone)]
pub struct SafedropRepository {
    db: DatabaseConnection,
}

impl SafedropRepository {
    /// Creates a new safedrop repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves `amount` of a day's safedrop into the target account.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing or archived sale or target account,
    /// `NoCashAccount`, or a `Rule` error for invalid amounts, over-allocation
    /// and unusable targets.
    pub async fn resolve(
        &self,
        input: ResolveSafedropInput,
    ) -> Result<ResolvedSafedrop, SafedropRepoError> {
        let txn = self.db.begin().await?;

        let sale = find_locked::<daily_sales::Entity>(&txn, input.daily_sale_id).await?;
        if sale.status == RecordStatus::Archived {
            return Err(RecordError::not_found("Daily sale", sale.id).into());
        }

        let cash = find_cash_account(&txn)
            .await?
            .ok_or(SafedropRepoError::NoCashAccount)?;
        let transfer = SafedropTransfer::new(cash.id, input.target_account_id, input.amount)?;

        let mut target = None;
        let mut locked_cash = None;
        for id in transfer.lock_order() {
            let locked = for_update(accounts::Entity::find(), txn.get_database_backend())
                .filter(accounts::Column::Id.eq(id))
                .one(&txn)
                .await?;
            if id == cash.id {
                locked_cash = locked;
            } else {
                target = locked;
            }
        }
        // The cash row may have been archived or deactivated since the unlocked read.
        if !locked_cash.as_ref().is_some_and(is_usable_cash) {
            return Err(SafedropRepoError::NoCashAccount);
        }
        let target = target
            .ok_or_else(|| RecordError::not_found("Account", input.target_account_id))?;
        if target.status == RecordStatus::Archived {
            return Err(RecordError::not_found("Account", target.id).into());
        }
        if target.kind == AccountKind::Cash {
            return Err(SafedropError::TargetIsCash.into());
        }
        if !target.is_active {
            return Err(SafedropError::TargetUnavailable(target.id).into());
        }

        let position = SafedropPosition::new(
            sale.safedrops_amount,
            resolution_amounts(&txn, sale.id).await?,
        );
        let after = match SafedropService::check_allocation(position, input.amount) {
            Ok(after) => after,
            Err(err) => {
                warn!(daily_sale_id = %sale.id, amount = %input.amount, error = %err, "Safedrop resolution rejected");
                return Err(err.into());
            }
        };

        let now = Utc::now().into();
        let reference = generate_reference(SAFEDROP_PREFIX, sale.sale_date);

        let transaction = transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_type: Set(TransactionType::Transfer),
            amount: Set(input.amount),
            source_account_id: Set(Some(cash.id)),
            target_account_id: Set(Some(target.id)),
            description: Set(Some(format!("Safedrop resolution for {}", sale.sale_date))),
            reference_number: Set(Some(reference.clone())),
            transaction_date: Set(sale.sale_date),
            origin: Set(TransactionOrigin::Safedrop),
            loan_id: Set(None),
            expense_type_id: Set(None),
            created_by: Set(Some(input.created_by)),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let resolution = safedrop_resolutions::ActiveModel {
            id: Set(Uuid::now_v7()),
            daily_sale_id: Set(sale.id),
            account_id: Set(target.id),
            amount: Set(input.amount),
            resolution_type: Set(ResolutionType::Safedrops),
            transaction_id: Set(transaction.id),
            reference_number: Set(reference.clone()),
            note: Set(input.note),
            created_by: Set(input.created_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        apply_effects(&txn, &transfer.effects()).await?;

        txn.commit().await?;

        info!(
            daily_sale_id = %sale.id,
            account_id = %target.id,
            amount = %input.amount,
            reference = %reference,
            remaining = %after.remaining(),
            "Safedrop resolved"
        );

        Ok(ResolvedSafedrop {
            resolution,
            transaction,
            resolved_total: after.resolved,
            remaining: after.remaining(),
            state: after.state(),
        })
    }

    /// Lists the resolutions of one daily sale with its settlement position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the sale does not exist.
    pub async fn for_sale(&self, daily_sale_id: Uuid) -> Result<SafedropSummary, RecordError> {
        let sale = find::<daily_sales::Entity, _>(&self.db, daily_sale_id).await?;

        let resolutions = safedrop_resolutions::Entity::find()
            .filter(safedrop_resolutions::Column::DailySaleId.eq(daily_sale_id))
            .order_by_asc(safedrop_resolutions::Column::CreatedAt)
            .order_by_asc(safedrop_resolutions::Column::Id)
            .all(&self.db)
            .await?;

        let position =
            SafedropPosition::new(sale.safedrops_amount, resolutions.iter().map(|r| r.amount));

        Ok(SafedropSummary {
            daily_sale_id,
            safedrops_amount: sale.safedrops_amount,
            resolved_total: position.resolved,
            remaining: position.remaining(),
            state: position.state(),
            resolutions,
        })
    }

    /// Active daily sales in `from..=to` with safedrop cash left to resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn pending(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PendingSafedrop>, RecordError> {
        let sales = daily_sales::Entity::find()
            .filter(daily_sales::Column::Status.eq(RecordStatus::Active))
            .filter(daily_sales::Column::SaleDate.between(from, to))
            .filter(daily_sales::Column::SafedropsAmount.gt(Decimal::ZERO))
            .order_by_asc(daily_sales::Column::SaleDate)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let rows: Vec<(Uuid, Decimal)> = safedrop_resolutions::Entity::find()
            .select_only()
            .column(safedrop_resolutions::Column::DailySaleId)
            .column(safedrop_resolutions::Column::Amount)
            .filter(safedrop_resolutions::Column::DailySaleId.is_in(ids))
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut resolved: HashMap<Uuid, Decimal> = HashMap::new();
        for (sale_id, amount) in rows {
            *resolved.entry(sale_id).or_default() += amount;
        }

        Ok(sales
            .into_iter()
            .filter_map(|sale| {
                let position = SafedropPosition {
                    declared: sale.safedrops_amount,
                    resolved: resolved.get(&sale.id).copied().unwrap_or_default(),
                };
                (position.state() != SettlementState::Resolved).then(|| PendingSafedrop {
                    daily_sale_id: sale.id,
                    sale_date: sale.sale_date,
                    safedrops_amount: sale.safedrops_amount,
                    resolved_total: position.resolved,
                    remaining: position.remaining(),
                    state: position.state(),
                })
            })
            .collect())
    }
}

async fn resolution_amounts<C: ConnectionTrait>(
    db: &C,
    daily_sale_id: Uuid,
) -> Result<Vec<Decimal>, DbErr> {
    safedrop_resolutions::Entity::find()
        .select_only()
        .column(safedrop_resolutions::Column::Amount)
        .filter(safedrop_resolutions::Column::DailySaleId.eq(daily_sale_id))
        .into_tuple()
        .all(db)
        .await
}

/// Sum of resolutions recorded against a daily sale.
pub(crate) async fn resolved_total<C: ConnectionTrait>(
    db: &C,
    daily_sale_id: Uuid,
) -> Result<Decimal, DbErr> {
    Ok(resolution_amounts(db, daily_sale_id).await?.into_iter().sum())
}
