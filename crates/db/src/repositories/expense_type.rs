//! Expense type repository. Types form a tree through `parent_id`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use forecourt_core::lifecycle::RecordStatus as CoreStatus;
use forecourt_shared::types::{PageRequest, PageResponse};

use super::lifecycle::{RecordError, SoftDeletable, find, find_active};
use super::query::{Sortable, paginate, scoped};
use crate::entities::{expense_types, sea_orm_active_enums::RecordStatus, transactions};

const SORTABLE: Sortable<expense_types::Column> = Sortable {
    columns: &[
        ("name", expense_types::Column::Name),
        ("created_at", expense_types::Column::CreatedAt),
    ],
    default: "name",
    tie_breaker: expense_types::Column::Id,
};

#[async_trait]
impl SoftDeletable for expense_types::Entity {
    const RESOURCE: &'static str = "Expense type";

    fn id_column() -> expense_types::Column {
        expense_types::Column::Id
    }
    fn status_column() -> expense_types::Column {
        expense_types::Column::Status
    }
    fn archived_at_column() -> expense_types::Column {
        expense_types::Column::ArchivedAt
    }
    fn updated_at_column() -> expense_types::Column {
        expense_types::Column::UpdatedAt
    }
    fn status_of(model: &expense_types::Model) -> CoreStatus {
        model.status.into()
    }

    /// Children, archived or not, and referencing transactions.
    async fn count_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        let children = expense_types::Entity::find()
            .filter(expense_types::Column::ParentId.eq(id))
            .count(txn)
            .await?;
        let referencing = transactions::Entity::find()
            .filter(transactions::Column::ExpenseTypeId.eq(id))
            .count(txn)
            .await?;
        Ok(children + referencing)
    }
}

/// Input for creating an expense type.
#[derive(Debug, Clone)]
pub struct CreateExpenseTypeInput {
    /// Display name.
    pub name: String,
    /// Parent type.
    pub parent_id: Option<Uuid>,
}

/// Input for updating an expense type.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseTypeInput {
    /// New name.
    pub name: Option<String>,
    /// New parent; `Some(None)` makes it a root.
    pub parent_id: Option<Option<Uuid>>,
}

/// Expense type repository.
#[derive(Debug, Clone)]
pub struct ExpenseTypeRepository {
    db: DatabaseConnection,
}

impl ExpenseTypeRepository {
    /// Creates a new expense type repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense type.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the parent is missing or archived.
    pub async fn create(
        &self,
        input: CreateExpenseTypeInput,
    ) -> Result<expense_types::Model, RecordError> {
        if let Some(parent_id) = input.parent_id {
            ensure_parent(&self.db, parent_id).await?;
        }

        let now = Utc::now().into();
        let model = expense_types::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            parent_id: Set(input.parent_id),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Lists expense types, optionally only the children of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        parent_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<PageResponse<expense_types::Model>, RecordError> {
        let mut query = scoped(
            expense_types::Entity::find(),
            expense_types::Column::Status,
            page.archive_scope(),
        );
        if let Some(parent_id) = parent_id {
            query = query.filter(expense_types::Column::ParentId.eq(parent_id));
        }
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds an expense type by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no type has the ID.
    pub async fn find(&self, id: Uuid) -> Result<expense_types::Model, RecordError> {
        find::<expense_types::Entity, _>(&self.db, id).await
    }

    /// Renames or re-parents an expense type.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Invalid` if the new parent is unavailable or
    /// would create a cycle.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateExpenseTypeInput,
    ) -> Result<expense_types::Model, RecordError> {
        let model = self.find(id).await?;

        if let Some(Some(parent_id)) = input.parent_id {
            ensure_parent(&self.db, parent_id).await?;
            if creates_cycle(&self.db, id, parent_id).await? {
                return Err(RecordError::invalid(
                    "parent_id",
                    "An expense type cannot be its own ancestor",
                ));
            }
        }

        let mut active: expense_types::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(parent_id) = input.parent_id {
            active.parent_id = Set(parent_id);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}

async fn ensure_parent<C: ConnectionTrait>(db: &C, parent_id: Uuid) -> Result<(), RecordError> {
    find_active::<expense_types::Entity, _>(db, parent_id)
        .await
        .map(|_| ())
        .map_err(|_| RecordError::invalid("parent_id", "The selected parent is invalid"))
}

/// True if `id` is `parent_id` or one of its ancestors.
async fn creates_cycle<C: ConnectionTrait>(db: &C, id: Uuid, parent_id: Uuid) -> Result<bool, DbErr> {
    let mut current = Some(parent_id);
    while let Some(node) = current {
        if node == id {
            return Ok(true);
        }
        current = expense_types::Entity::find_by_id(node)
            .one(db)
            .await?
            .and_then(|m| m.parent_id);
    }
    Ok(false)
}
