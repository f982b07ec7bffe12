//! Tests for report generation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::error::ReportError;
use super::service::ReportService;
use super::types::{PayrollEmployee, PayrollEntry};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn employee(id: u128, name: &str) -> PayrollEmployee {
    PayrollEmployee {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        position: Some("Cashier".to_string()),
        hourly_rate: dec!(17.50),
    }
}

fn stub(employee: u128, pay_date: NaiveDate, gross: Decimal) -> PayrollEntry {
    PayrollEntry {
        employee_id: Uuid::from_u128(employee),
        pay_date,
        hours_worked: dec!(40),
        gross_pay: gross,
        deductions: dec!(100),
        net_pay: gross - dec!(100),
    }
}

#[test]
fn test_period_rejects_reversed_range() {
    let result = ReportService::period(date(2024, 3, 31), date(2024, 3, 1));
    assert!(matches!(result, Err(ReportError::InvalidDateRange { .. })));
}

#[test]
fn test_payroll_report_period_and_ytd() {
    let period = ReportService::period(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
    let employees = vec![employee(2, "Zoe"), employee(1, "Alex"), employee(3, "Idle")];
    let entries = vec![
        stub(1, date(2023, 12, 29), dec!(900)), // previous year
        stub(1, date(2024, 1, 15), dec!(700)),
        stub(1, date(2024, 3, 15), dec!(800)),
        stub(1, date(2024, 3, 29), dec!(800)),
        stub(2, date(2024, 2, 15), dec!(600)),
        stub(2, date(2024, 4, 1), dec!(600)), // after the period
    ];

    let report = ReportService::generate_payroll_report(period, employees, &entries);

    assert_eq!(report.year_start, date(2024, 1, 1));
    let names: Vec<&str> = report.employees.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Alex", "Zoe"]);

    let alex = &report.employees[0];
    assert_eq!(alex.pay_count, 2);
    assert_eq!(alex.period.gross_pay, dec!(1600));
    assert_eq!(alex.period.hours_worked, dec!(80));
    assert_eq!(alex.year_to_date.gross_pay, dec!(2300));

    let zoe = &report.employees[1];
    assert_eq!(zoe.pay_count, 0);
    assert_eq!(zoe.period.gross_pay, Decimal::ZERO);
    assert_eq!(zoe.year_to_date.gross_pay, dec!(600));

    assert_eq!(report.period_totals.gross_pay, dec!(1600));
    assert_eq!(report.year_to_date_totals.gross_pay, dec!(2900));
    assert_eq!(report.year_to_date_totals.net_pay, dec!(2600));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* set of stubs within one year, YTD totals are at least the
    /// period totals and the report totals equal the sum of the lines.
    #[test]
    fn prop_ytd_covers_period(
        stubs in prop::collection::vec((0u128..4, 1u32..=12, 1u32..=28, 1i64..500_000), 0..40),
        start_month in 1u32..=12,
    ) {
        let period = ReportService::period(date(2024, start_month, 1), date(2024, 12, 31)).unwrap();
        let employees = (0..4).map(|i| employee(i, &format!("E{i}"))).collect();
        let entries: Vec<PayrollEntry> = stubs
            .iter()
            .map(|(e, m, d, cents)| stub(*e, date(2024, *m, *d), Decimal::new(*cents, 2)))
            .collect();

        let report = ReportService::generate_payroll_report(period, employees, &entries);

        let expected_ytd: Decimal = entries.iter().map(|e| e.gross_pay).sum();
        prop_assert_eq!(report.year_to_date_totals.gross_pay, expected_ytd);

        let mut line_sum = Decimal::ZERO;
        for line in &report.employees {
            prop_assert!(line.year_to_date.gross_pay >= line.period.gross_pay);
            line_sum += line.period.gross_pay;
        }
        prop_assert_eq!(report.period_totals.gross_pay, line_sum);
    }
}
