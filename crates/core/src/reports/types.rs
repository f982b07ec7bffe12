//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

/// Employee as seen by the payroll report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollEmployee {
    /// Employee ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Job position.
    pub position: Option<String>,
    /// Hourly rate.
    pub hourly_rate: Decimal,
}

/// One pay stub fed into the payroll report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollEntry {
    /// Employee paid.
    pub employee_id: Uuid,
    /// Date the pay was issued; decides which period it counts in.
    pub pay_date: NaiveDate,
    /// Hours worked in the pay period.
    pub hours_worked: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Deductions withheld.
    pub deductions: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
}

/// Summed payroll figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Hours worked.
    pub hours_worked: Decimal,
    /// Gross pay.
    pub gross_pay: Decimal,
    /// Deductions.
    pub deductions: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
}

impl PayrollTotals {
    /// Adds one pay stub.
    pub fn add(&mut self, entry: &PayrollEntry) {
        self.hours_worked += entry.hours_worked;
        self.gross_pay += entry.gross_pay;
        self.deductions += entry.deductions;
        self.net_pay += entry.net_pay;
    }

    /// Adds another set of totals.
    pub fn merge(&mut self, other: &Self) {
        self.hours_worked += other.hours_worked;
        self.gross_pay += other.gross_pay;
        self.deductions += other.deductions;
        self.net_pay += other.net_pay;
    }
}

/// Per-employee line of the payroll report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReportLine {
    /// Employee ID.
    pub employee_id: Uuid,
    /// Employee name.
    pub name: String,
    /// Job position.
    pub position: Option<String>,
    /// Hourly rate.
    pub hourly_rate: Decimal,
    /// Number of pay stubs in the period.
    pub pay_count: usize,
    /// Totals within the period.
    pub period: PayrollTotals,
    /// Totals from January 1 of the period's end year through its end.
    pub year_to_date: PayrollTotals,
}

/// Payroll report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// Report type identifier.
    pub report_type: String,
    /// Covered period.
    pub period: ReportPeriod,
    /// First day of the year-to-date window.
    pub year_start: NaiveDate,
    /// One line per employee, sorted by name.
    pub employees: Vec<PayrollReportLine>,
    /// Sum of all period totals.
    pub period_totals: PayrollTotals,
    /// Sum of all year-to-date totals.
    pub year_to_date_totals: PayrollTotals,
}
