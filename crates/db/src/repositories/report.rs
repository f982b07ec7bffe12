//! Report data loading.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use forecourt_core::reports::{
    PayrollEmployee, PayrollEntry, PayrollReport, ReportError, ReportService,
};

use super::lifecycle::RecordError;
use crate::entities::{employees, payrolls, sea_orm_active_enums::RecordStatus};

impl From<ReportError> for RecordError {
    fn from(err: ReportError) -> Self {
        Self::invalid("end_date", err.to_string())
    }
}

/// Loads the rows behind reports and hands them to `ReportService`.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Payroll report for `start..=end` with year-to-date totals.
    ///
    /// Archived pay stubs are excluded. Archived employees still appear when
    /// they were paid in the window.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if `start` is after `end`.
    pub async fn payroll(&self, start: NaiveDate, end: NaiveDate) -> Result<PayrollReport, RecordError> {
        let period = ReportService::period(start, end)?;
        let year_start = ReportService::year_start(&period);

        let entries: Vec<PayrollEntry> = payrolls::Entity::find()
            .filter(payrolls::Column::Status.eq(RecordStatus::Active))
            .filter(payrolls::Column::PayDate.between(year_start, period.end))
            .order_by_asc(payrolls::Column::PayDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| PayrollEntry {
                employee_id: p.employee_id,
                pay_date: p.pay_date,
                hours_worked: p.hours_worked,
                gross_pay: p.gross_pay,
                deductions: p.deductions,
                net_pay: p.net_pay,
            })
            .collect();

        let mut ids: Vec<_> = entries.iter().map(|e| e.employee_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let employees = employees::Entity::find()
            .filter(employees::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| PayrollEmployee {
                id: e.id,
                name: e.name,
                position: e.position,
                hourly_rate: e.hourly_rate,
            })
            .collect();

        Ok(ReportService::generate_payroll_report(period, employees, &entries))
    }
}
