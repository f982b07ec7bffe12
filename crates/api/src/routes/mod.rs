//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod accounts;
pub mod daily_sales;
pub mod employees;
pub mod expense_types;
pub mod fuel_prices;
pub mod health;
pub mod lifecycle;
pub mod loans;
pub mod payrolls;
pub mod reports;
pub mod safedrops;
pub mod sync_jobs;
pub mod transactions;

/// Creates the API router; everything except `/health` requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(daily_sales::routes())
        .merge(safedrops::routes())
        .merge(transactions::routes())
        .merge(loans::routes())
        .merge(expense_types::routes())
        .merge(employees::routes())
        .merge(payrolls::routes())
        .merge(fuel_prices::routes())
        .merge(sync_jobs::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
