//! Payroll repository: one row per pay stub.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use forecourt_core::lifecycle::RecordStatus as CoreStatus;
use forecourt_shared::types::{PageRequest, PageResponse, non_negative_amount};

use super::lifecycle::{RecordError, SoftDeletable, find, find_active};
use super::query::{Sortable, paginate, scoped};
use crate::entities::{employees, payrolls, sea_orm_active_enums::RecordStatus};

const SORTABLE: Sortable<payrolls::Column> = Sortable {
    columns: &[
        ("pay_date", payrolls::Column::PayDate),
        ("period_start", payrolls::Column::PeriodStart),
        ("gross_pay", payrolls::Column::GrossPay),
        ("net_pay", payrolls::Column::NetPay),
    ],
    default: "pay_date",
    tie_breaker: payrolls::Column::Id,
};

#[async_trait]
impl SoftDeletable for payrolls::Entity {
    const RESOURCE: &'static str = "Payroll";

    fn id_column() -> payrolls::Column {
        payrolls::Column::Id
    }
    fn status_column() -> payrolls::Column {
        payrolls::Column::Status
    }
    fn archived_at_column() -> payrolls::Column {
        payrolls::Column::ArchivedAt
    }
    fn updated_at_column() -> payrolls::Column {
        payrolls::Column::UpdatedAt
    }
    fn status_of(model: &payrolls::Model) -> CoreStatus {
        model.status.into()
    }
}

/// Input for recording a pay stub. Net pay is gross pay minus deductions.
#[derive(Debug, Clone)]
pub struct CreatePayrollInput {
    /// Employee paid.
    pub employee_id: Uuid,
    /// First day of the pay period.
    pub period_start: NaiveDate,
    /// Last day of the pay period.
    pub period_end: NaiveDate,
    /// Date the pay was issued.
    pub pay_date: NaiveDate,
    /// Hours worked.
    pub hours_worked: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Deductions withheld.
    pub deductions: Decimal,
}

/// Filter options for listing pay stubs.
#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    /// Filter by employee.
    pub employee_id: Option<Uuid>,
    /// Earliest pay date.
    pub from: Option<NaiveDate>,
    /// Latest pay date.
    pub to: Option<NaiveDate>,
}

/// Payroll repository.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    db: DatabaseConnection,
}

impl PayrollRepository {
    /// Creates a new payroll repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a pay stub.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for an unavailable employee, an inverted period, bad
    /// amounts, or deductions above gross pay.
    pub async fn create(&self, input: CreatePayrollInput) -> Result<payrolls::Model, RecordError> {
        if input.period_start > input.period_end {
            return Err(RecordError::invalid(
                "period_end",
                "The period end must not be before the period start",
            ));
        }
        for (field, amount) in [
            ("hours_worked", input.hours_worked),
            ("gross_pay", input.gross_pay),
            ("deductions", input.deductions),
        ] {
            non_negative_amount(amount)
                .map_err(|e| RecordError::invalid(field, format!("The {field} {e}")))?;
        }
        if input.deductions > input.gross_pay {
            return Err(RecordError::invalid(
                "deductions",
                "Deductions cannot exceed gross pay",
            ));
        }
        find_active::<employees::Entity, _>(&self.db, input.employee_id)
            .await
            .map_err(|_| RecordError::invalid("employee_id", "The selected employee is invalid"))?;

        let now = Utc::now().into();
        let payroll = payrolls::ActiveModel {
            id: Set(Uuid::now_v7()),
            employee_id: Set(input.employee_id),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            pay_date: Set(input.pay_date),
            hours_worked: Set(input.hours_worked),
            gross_pay: Set(input.gross_pay),
            deductions: Set(input.deductions),
            net_pay: Set(input.gross_pay - input.deductions),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(payroll_id = %payroll.id, employee_id = %payroll.employee_id, pay_date = %payroll.pay_date, "Payroll recorded");
        Ok(payroll)
    }

    /// Lists pay stubs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: PayrollFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<payrolls::Model>, RecordError> {
        let mut query = scoped(
            payrolls::Entity::find(),
            payrolls::Column::Status,
            page.archive_scope(),
        );
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(payrolls::Column::EmployeeId.eq(employee_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(payrolls::Column::PayDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(payrolls::Column::PayDate.lte(to));
        }
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a pay stub by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no stub has the ID.
    pub async fn find(&self, id: Uuid) -> Result<payrolls::Model, RecordError> {
        find::<payrolls::Entity, _>(&self.db, id).await
    }
}
