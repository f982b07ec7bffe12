//! Payroll report over stored pay stubs.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{date, setup};
use forecourt_db::{
    EmployeeRepository, PayrollRepository, ReportRepository,
    entities::payrolls,
    repositories::{CreateEmployeeInput, CreatePayrollInput, RecordError, archive},
};

async fn stub(
    repo: &PayrollRepository,
    employee_id: uuid::Uuid,
    pay_date: chrono::NaiveDate,
    gross: Decimal,
) -> payrolls::Model {
    repo.create(CreatePayrollInput {
        employee_id,
        period_start: pay_date - chrono::TimeDelta::days(13),
        period_end: pay_date,
        pay_date,
        hours_worked: dec!(40),
        gross_pay: gross,
        deductions: dec!(100),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_payroll_report_period_and_year_to_date() {
    let db = setup().await;
    let employees = EmployeeRepository::new(db.clone());
    let payroll = PayrollRepository::new(db.clone());
    let ana = employees
        .create(CreateEmployeeInput {
            name: "Ana".into(),
            position: Some("Cashier".into()),
            hourly_rate: dec!(20),
        })
        .await
        .unwrap();
    let ben = employees
        .create(CreateEmployeeInput {
            name: "Ben".into(),
            position: None,
            hourly_rate: dec!(22.5),
        })
        .await
        .unwrap();

    stub(&payroll, ana.id, date(2026, 1, 15), dec!(800)).await;
    stub(&payroll, ana.id, date(2026, 3, 13), dec!(800)).await;
    let voided = stub(&payroll, ana.id, date(2026, 3, 20), dec!(800)).await;
    stub(&payroll, ben.id, date(2025, 12, 31), dec!(900)).await;
    stub(&payroll, ben.id, date(2026, 2, 13), dec!(900)).await;
    archive::<payrolls::Entity>(&db, voided.id).await.unwrap();

    let report = ReportRepository::new(db.clone())
        .payroll(date(2026, 3, 1), date(2026, 3, 31))
        .await
        .unwrap();

    assert_eq!(report.year_start, date(2026, 1, 1));
    assert_eq!(report.employees.len(), 2);

    let ana_line = &report.employees[0];
    assert_eq!(ana_line.name, "Ana");
    assert_eq!(ana_line.pay_count, 1);
    assert_eq!(ana_line.period.gross_pay, dec!(800));
    assert_eq!(ana_line.year_to_date.gross_pay, dec!(1600));
    assert_eq!(ana_line.year_to_date.net_pay, dec!(1400));

    let ben_line = &report.employees[1];
    assert_eq!(ben_line.pay_count, 0);
    assert_eq!(ben_line.year_to_date.gross_pay, dec!(900));

    assert_eq!(report.period_totals.gross_pay, dec!(800));
    assert_eq!(report.year_to_date_totals.gross_pay, dec!(2500));
}

#[tokio::test]
async fn test_inverted_period_is_rejected() {
    let db = setup().await;
    let err = ReportRepository::new(db)
        .payroll(date(2026, 3, 31), date(2026, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Invalid { .. }));
}
