//! Database seeder for Forecourt development and testing.
//!
//! Seeds the cash and bank accounts, expense categories, two employees with a
//! payroll each, a week of daily sales and today's fuel prices, then prints an
//! owner token for calling the API. Rows that already exist are skipped.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use forecourt_core::pricing::FuelPrices;
use forecourt_db::{
    AccountRepository, DailySaleRepository, EmployeeRepository, ExpenseTypeRepository,
    FuelPriceRepository, PayrollRepository, RecordError,
    entities::sea_orm_active_enums::AccountKind,
    repositories::{
        CreateAccountInput, CreateDailySaleInput, CreateEmployeeInput, CreateExpenseTypeInput,
        CreateFuelPriceInput, CreatePayrollInput,
    },
};
use forecourt_shared::{AppConfig, JwtConfig, JwtService, Role, types::PageRequest};

/// Staff member the seeded records and the printed token belong to.
const SEED_USER_ID: Uuid = Uuid::from_u128(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = forecourt_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding accounts...");
    seed_accounts(&AccountRepository::new(db.clone())).await?;

    println!("Seeding expense types...");
    seed_expense_types(&ExpenseTypeRepository::new(db.clone())).await?;

    println!("Seeding employees and payrolls...");
    seed_staff(
        &EmployeeRepository::new(db.clone()),
        &PayrollRepository::new(db.clone()),
    )
    .await?;

    let today = Utc::now().date_naive();

    println!("Seeding daily sales...");
    seed_daily_sales(&DailySaleRepository::new(db.clone()), today).await?;

    println!("Seeding fuel prices...");
    seed_fuel_prices(&FuelPriceRepository::new(db.clone()), today).await?;

    let jwt = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: 8 * 60,
    });
    let token = jwt
        .generate_access_token(SEED_USER_ID, "Seed Owner", Role::Owner)
        .context("Failed to issue development token")?;

    println!("Seeding complete!");
    println!("Owner token (8h): {token}");
    Ok(())
}

/// Existing rows, archived ones included.
fn any_rows() -> PageRequest {
    PageRequest {
        per_page: 1,
        with_archived: true,
        ..PageRequest::default()
    }
}

/// Prints the outcome of one insert; duplicates are skipped, anything else aborts.
fn report<T>(label: &str, result: Result<T, RecordError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => {
            println!("  Created {label}");
            Ok(Some(value))
        }
        Err(RecordError::Duplicate(_)) => {
            println!("  {label} already exists, skipping...");
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to seed {label}")),
    }
}

async fn seed_accounts(repo: &AccountRepository) -> anyhow::Result<()> {
    for (name, kind, description) in [
        ("Cash", AccountKind::Cash, "Till and safe"),
        ("Chequing", AccountKind::Bank, "Main operating account"),
        ("Savings", AccountKind::Bank, "Reserve"),
        ("Visa", AccountKind::Credit, "Fuel card"),
    ] {
        let result = repo
            .create(CreateAccountInput {
                name: name.to_string(),
                kind,
                description: Some(description.to_string()),
                is_active: true,
            })
            .await;
        report(&format!("account '{name}'"), result)?;
    }
    Ok(())
}

async fn seed_expense_types(repo: &ExpenseTypeRepository) -> anyhow::Result<()> {
    if repo.list(None, &any_rows()).await?.meta.total > 0 {
        println!("  Expense types already exist, skipping...");
        return Ok(());
    }

    let parents = [
        ("Fuel", &["Delivery", "Tank maintenance"][..]),
        ("Store", &["Inventory", "Supplies"][..]),
        ("Utilities", &[][..]),
    ];

    for (name, children) in parents {
        let parent = repo
            .create(CreateExpenseTypeInput {
                name: name.to_string(),
                parent_id: None,
            })
            .await
            .with_context(|| format!("Failed to seed expense type '{name}'"))?;
        println!("  Created expense type '{name}'");

        for child in children {
            repo.create(CreateExpenseTypeInput {
                name: (*child).to_string(),
                parent_id: Some(parent.id),
            })
            .await
            .with_context(|| format!("Failed to seed expense type '{child}'"))?;
            println!("  Created expense type '{child}'");
        }
    }
    Ok(())
}

async fn seed_staff(
    employees: &EmployeeRepository,
    payrolls: &PayrollRepository,
) -> anyhow::Result<()> {
    if employees.list(&any_rows()).await?.meta.total > 0 {
        println!("  Employees already exist, skipping...");
        return Ok(());
    }

    let period_start = NaiveDate::from_ymd_opt(2026, 3, 1).context("invalid date")?;
    let period_end = NaiveDate::from_ymd_opt(2026, 3, 14).context("invalid date")?;
    let pay_date = NaiveDate::from_ymd_opt(2026, 3, 15).context("invalid date")?;

    for (name, position, rate, hours) in [
        ("Alex Morgan", "Cashier", dec!(17.50), dec!(72)),
        ("Jordan Lee", "Shift lead", dec!(21.00), dec!(80)),
    ] {
        let employee = employees
            .create(CreateEmployeeInput {
                name: name.to_string(),
                position: Some(position.to_string()),
                hourly_rate: rate,
            })
            .await
            .with_context(|| format!("Failed to seed employee '{name}'"))?;
        println!("  Created employee '{name}'");

        let gross_pay = rate * hours;
        payrolls
            .create(CreatePayrollInput {
                employee_id: employee.id,
                period_start,
                period_end,
                pay_date,
                hours_worked: hours,
                gross_pay,
                deductions: (gross_pay * dec!(0.2)).round_dp(2),
            })
            .await
            .with_context(|| format!("Failed to seed payroll for '{name}'"))?;
    }
    Ok(())
}

async fn seed_daily_sales(repo: &DailySaleRepository, today: NaiveDate) -> anyhow::Result<()> {
    for offset in 1..=7u64 {
        let Some(sale_date) = today.checked_sub_days(Days::new(offset)) else {
            continue;
        };
        let step = Decimal::from(offset) * dec!(25);
        let result = repo
            .create(CreateDailySaleInput {
                sale_date,
                cash_total: dec!(1200) + step,
                card_total: dec!(2400) + step,
                fuel_total: dec!(5100) + step,
                safedrops_amount: dec!(900) + step,
                notes: None,
                created_by: Some(SEED_USER_ID),
            })
            .await;
        report(&format!("daily sale {sale_date}"), result)?;
    }
    Ok(())
}

async fn seed_fuel_prices(repo: &FuelPriceRepository, today: NaiveDate) -> anyhow::Result<()> {
    let result = repo
        .create(CreateFuelPriceInput {
            effective_date: today,
            prices: FuelPrices {
                regular: Some(dec!(1.589)),
                midgrade: Some(dec!(1.789)),
                premium: Some(dec!(1.929)),
                diesel: Some(dec!(1.699)),
            },
        })
        .await;
    report(&format!("fuel prices for {today}"), result)?;
    Ok(())
}
