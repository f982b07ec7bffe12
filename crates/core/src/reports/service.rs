//! Report generation service.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::error::ReportError;
use super::types::{
    PayrollEmployee, PayrollEntry, PayrollReport, PayrollReportLine, PayrollTotals, ReportPeriod,
};

/// Service for generating reports.
pub struct ReportService;

impl ReportService {
    /// Validates a report period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start` is after `end`.
    pub fn period(start: NaiveDate, end: NaiveDate) -> Result<ReportPeriod, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(ReportPeriod { start, end })
    }

    /// First day of the year-to-date window for `period`.
    #[must_use]
    pub fn year_start(period: &ReportPeriod) -> NaiveDate {
        period.end.with_ordinal(1).unwrap_or(period.end)
    }

    /// Aggregates pay stubs into per-employee period and YTD totals.
    ///
    /// `entries` should cover at least `year_start..=period.end`; stubs outside
    /// that window are ignored. Employees with no stub in the window are left out.
    #[must_use]
    pub fn generate_payroll_report(
        period: ReportPeriod,
        employees: Vec<PayrollEmployee>,
        entries: &[PayrollEntry],
    ) -> PayrollReport {
        let year_start = Self::year_start(&period);

        let mut by_employee: HashMap<Uuid, (usize, PayrollTotals, PayrollTotals)> = HashMap::new();
        for entry in entries {
            if entry.pay_date < year_start || entry.pay_date > period.end {
                continue;
            }
            let (count, in_period, ytd) = by_employee.entry(entry.employee_id).or_default();
            ytd.add(entry);
            if entry.pay_date >= period.start {
                in_period.add(entry);
                *count += 1;
            }
        }

        let mut lines: Vec<PayrollReportLine> = employees
            .into_iter()
            .filter_map(|employee| {
                let (pay_count, period_totals, ytd) = by_employee.remove(&employee.id)?;
                Some(PayrollReportLine {
                    employee_id: employee.id,
                    name: employee.name,
                    position: employee.position,
                    hourly_rate: employee.hourly_rate,
                    pay_count,
                    period: period_totals,
                    year_to_date: ytd,
                })
            })
            .collect();
        lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.employee_id.cmp(&b.employee_id)));

        let mut period_totals = PayrollTotals::default();
        let mut year_to_date_totals = PayrollTotals::default();
        for line in &lines {
            period_totals.merge(&line.period);
            year_to_date_totals.merge(&line.year_to_date);
        }

        PayrollReport {
            report_type: "payroll".to_string(),
            period,
            year_start,
            employees: lines,
            period_totals,
            year_to_date_totals,
        }
    }
}
