//! Employee repository.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use forecourt_core::lifecycle::RecordStatus as CoreStatus;
use forecourt_shared::types::{PageRequest, PageResponse, non_negative_amount};

use super::lifecycle::{RecordError, SoftDeletable, find};
use super::query::{Sortable, paginate, scoped};
use crate::entities::{employees, payrolls, sea_orm_active_enums::RecordStatus};

const SORTABLE: Sortable<employees::Column> = Sortable {
    columns: &[
        ("name", employees::Column::Name),
        ("position", employees::Column::Position),
        ("hourly_rate", employees::Column::HourlyRate),
        ("created_at", employees::Column::CreatedAt),
    ],
    default: "name",
    tie_breaker: employees::Column::Id,
};

#[async_trait]
impl SoftDeletable for employees::Entity {
    const RESOURCE: &'static str = "Employee";

    fn id_column() -> employees::Column {
        employees::Column::Id
    }
    fn status_column() -> employees::Column {
        employees::Column::Status
    }
    fn archived_at_column() -> employees::Column {
        employees::Column::ArchivedAt
    }
    fn updated_at_column() -> employees::Column {
        employees::Column::UpdatedAt
    }
    fn status_of(model: &employees::Model) -> CoreStatus {
        model.status.into()
    }

    async fn count_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        payrolls::Entity::find()
            .filter(payrolls::Column::EmployeeId.eq(id))
            .count(txn)
            .await
    }
}

/// Input for creating an employee.
#[derive(Debug, Clone)]
pub struct CreateEmployeeInput {
    /// Full name.
    pub name: String,
    /// Job position.
    pub position: Option<String>,
    /// Hourly rate.
    pub hourly_rate: Decimal,
}

/// Input for updating an employee.
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeInput {
    /// New name.
    pub name: Option<String>,
    /// New position; `Some(None)` clears it.
    pub position: Option<Option<String>>,
    /// New hourly rate.
    pub hourly_rate: Option<Decimal>,
}

/// Employee repository.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    /// Creates a new employee repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a negative or sub-cent hourly rate.
    pub async fn create(&self, input: CreateEmployeeInput) -> Result<employees::Model, RecordError> {
        check_rate(input.hourly_rate)?;

        let now = Utc::now().into();
        let model = employees::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            position: Set(input.position),
            hourly_rate: Set(input.hourly_rate),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Lists employees.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<employees::Model>, RecordError> {
        let query = scoped(
            employees::Entity::find(),
            employees::Column::Status,
            page.archive_scope(),
        );
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds an employee by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no employee has the ID.
    pub async fn find(&self, id: Uuid) -> Result<employees::Model, RecordError> {
        find::<employees::Entity, _>(&self.db, id).await
    }

    /// Updates an employee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Invalid` for a bad hourly rate.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateEmployeeInput,
    ) -> Result<employees::Model, RecordError> {
        if let Some(rate) = input.hourly_rate {
            check_rate(rate)?;
        }
        let model = self.find(id).await?;

        let mut active: employees::ActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(position) = input.position {
            active.position = Set(position);
        }
        if let Some(rate) = input.hourly_rate {
            active.hourly_rate = Set(rate);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}

fn check_rate(rate: Decimal) -> Result<(), RecordError> {
    non_negative_amount(rate)
        .map(|_| ())
        .map_err(|e| RecordError::invalid("hourly_rate", format!("The hourly rate {e}")))
}
