//! Account repository for money accounts and their running balances.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use forecourt_core::{
    ledger::BalanceEffect,
    lifecycle::{LifecycleAction, RecordStatus as CoreStatus},
};
use forecourt_shared::types::{PageRequest, PageResponse};

use super::lifecycle::{RecordError, SoftDeletable, find};
use super::query::{Sortable, for_update, is_unique_violation, paginate, scoped};
use crate::entities::{
    accounts, safedrop_resolutions,
    sea_orm_active_enums::{AccountKind, RecordStatus},
    transactions,
};

const SORTABLE: Sortable<accounts::Column> = Sortable {
    columns: &[
        ("name", accounts::Column::Name),
        ("kind", accounts::Column::Kind),
        ("balance", accounts::Column::Balance),
        ("created_at", accounts::Column::CreatedAt),
    ],
    default: "name",
    tie_breaker: accounts::Column::Id,
};

#[async_trait]
impl SoftDeletable for accounts::Entity {
    const RESOURCE: &'static str = "Account";

    fn id_column() -> accounts::Column {
        accounts::Column::Id
    }
    fn status_column() -> accounts::Column {
        accounts::Column::Status
    }
    fn archived_at_column() -> accounts::Column {
        accounts::Column::ArchivedAt
    }
    fn updated_at_column() -> accounts::Column {
        accounts::Column::UpdatedAt
    }
    fn status_of(model: &accounts::Model) -> CoreStatus {
        model.status.into()
    }

    async fn count_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        let referencing = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::SourceAccountId.eq(id))
                    .add(transactions::Column::TargetAccountId.eq(id)),
            )
            .count(txn)
            .await?;
        let resolutions = safedrop_resolutions::Entity::find()
            .filter(safedrop_resolutions::Column::AccountId.eq(id))
            .count(txn)
            .await?;
        Ok(referencing + resolutions)
    }

    async fn on_transition(
        txn: &DatabaseTransaction,
        model: &accounts::Model,
        action: LifecycleAction,
    ) -> Result<(), RecordError> {
        if action != LifecycleAction::Restore || model.kind != AccountKind::Cash || !model.is_active {
            return Ok(());
        }
        let others = active_cash_query()
            .filter(accounts::Column::Id.ne(model.id))
            .count(txn)
            .await?;
        if others > 0 {
            return Err(RecordError::Duplicate(
                "An active cash account already exists".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Unique display name.
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the account accepts new money movements.
    pub is_active: bool,
}

/// Input for updating an account. Balances change only through transactions.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by kind.
    pub kind: Option<AccountKind>,
    /// Filter by active flag.
    pub is_active: Option<bool>,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken or a second active cash
    /// account would be created.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, RecordError> {
        self.ensure_name_free(&input.name, None).await?;
        if input.kind == AccountKind::Cash && input.is_active {
            self.ensure_no_other_cash(None).await?;
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name.clone()),
            kind: Set(input.kind),
            description: Set(input.description),
            balance: Set(Decimal::ZERO),
            is_active: Set(input.is_active),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(|e| duplicate_name(e, &input.name))
    }

    /// Lists accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: AccountFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<accounts::Model>, RecordError> {
        let mut query = scoped(
            accounts::Entity::find(),
            accounts::Column::Status,
            page.archive_scope(),
        );
        if let Some(kind) = filter.kind {
            query = query.filter(accounts::Column::Kind.eq(kind));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds an account by ID, archived or not.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no account has the ID.
    pub async fn find(&self, id: Uuid) -> Result<accounts::Model, RecordError> {
        find::<accounts::Entity, _>(&self.db, id).await
    }

    /// Updates an account's descriptive fields and active flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Duplicate` for a taken name or second active cash account.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountInput,
    ) -> Result<accounts::Model, RecordError> {
        let account = self.find(id).await?;

        if let Some(name) = &input.name
            && *name != account.name
        {
            self.ensure_name_free(name, Some(id)).await?;
        }
        if input.is_active == Some(true) && !account.is_active && account.kind == AccountKind::Cash {
            self.ensure_no_other_cash(Some(id)).await?;
        }

        let name = input.name.clone().unwrap_or_else(|| account.name.clone());
        let mut active: accounts::ActiveModel = account.into();
        if let Some(new_name) = input.name {
            active.name = Set(new_name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| duplicate_name(e, &name))
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), RecordError> {
        let mut query = accounts::Entity::find().filter(accounts::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RecordError::Duplicate(format!(
                "An account named '{name}' already exists"
            )));
        }
        Ok(())
    }

    async fn ensure_no_other_cash(&self, except: Option<Uuid>) -> Result<(), RecordError> {
        let mut query = active_cash_query();
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(RecordError::Duplicate(
                "An active cash account already exists".to_string(),
            ));
        }
        Ok(())
    }
}

fn duplicate_name(err: DbErr, name: &str) -> RecordError {
    if is_unique_violation(&err) {
        RecordError::Duplicate(format!("An account named '{name}' already exists"))
    } else {
        RecordError::Database(err)
    }
}

fn active_cash_query() -> sea_orm::Select<accounts::Entity> {
    accounts::Entity::find()
        .filter(accounts::Column::Kind.eq(AccountKind::Cash))
        .filter(accounts::Column::IsActive.eq(true))
        .filter(accounts::Column::Status.eq(RecordStatus::Active))
}

/// True when the account may take part in new money movements.
pub(crate) fn is_usable(account: &accounts::Model) -> bool {
    account.is_active && account.status == RecordStatus::Active
}

/// True when the account is the usable cash account.
pub(crate) fn is_usable_cash(account: &accounts::Model) -> bool {
    account.kind == AccountKind::Cash && is_usable(account)
}

/// Finds the active cash account.
pub(crate) async fn find_cash_account<C: ConnectionTrait>(
    db: &C,
) -> Result<Option<accounts::Model>, DbErr> {
    active_cash_query().one(db).await
}

/// Applies balance deltas, locking each account in ascending id order.
pub(crate) async fn apply_effects(
    txn: &DatabaseTransaction,
    effects: &[BalanceEffect],
) -> Result<(), DbErr> {
    let mut ordered = effects.to_vec();
    ordered.sort_by_key(|e| e.account_id);

    for effect in ordered {
        let account = for_update(accounts::Entity::find(), txn.get_database_backend())
            .filter(accounts::Column::Id.eq(effect.account_id))
            .one(txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("account {}", effect.account_id)))?;

        let balance = account.balance + effect.delta;
        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(balance);
        active.updated_at = Set(Utc::now().into());
        active.update(txn).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(kind: AccountKind, is_active: bool, status: RecordStatus) -> accounts::Model {
        let now = Utc::now().into();
        accounts::Model {
            id: Uuid::now_v7(),
            name: "Till".to_string(),
            kind,
            description: None,
            balance: Decimal::ZERO,
            is_active,
            status,
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_usable_cash_requires_active_cash_row() {
        assert!(is_usable_cash(&model(AccountKind::Cash, true, RecordStatus::Active)));
        assert!(!is_usable_cash(&model(AccountKind::Cash, false, RecordStatus::Active)));
        assert!(!is_usable_cash(&model(AccountKind::Cash, true, RecordStatus::Archived)));
        assert!(!is_usable_cash(&model(AccountKind::Bank, true, RecordStatus::Active)));
    }

    #[test]
    fn test_usable_ignores_kind() {
        assert!(is_usable(&model(AccountKind::Bank, true, RecordStatus::Active)));
        assert!(!is_usable(&model(AccountKind::Bank, false, RecordStatus::Active)));
        assert!(!is_usable(&model(AccountKind::Credit, true, RecordStatus::Archived)));
    }
}
