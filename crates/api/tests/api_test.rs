//! End-to-end handler tests: router, auth, envelopes and error shapes over
//! in-memory SQLite.

use std::{str::FromStr, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use forecourt_api::{AppState, create_router};
use forecourt_db::migration::Migrator;
use forecourt_shared::{JwtConfig, JwtService, Role};

struct TestApp {
    router: Router,
    jwt: Arc<JwtService>,
    db: DatabaseConnection,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_debug(false).await
    }

    async fn with_debug(debug: bool) -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "api-test-secret".to_string(),
            access_token_expires_minutes: 60,
        }));
        let state = AppState {
            db: Arc::new(db.clone()),
            jwt_service: jwt.clone(),
            debug,
        };
        Self {
            router: create_router(state, Duration::from_secs(30)),
            jwt,
            db,
        }
    }

    fn token(&self, role: Role) -> String {
        self.jwt
            .generate_access_token(Uuid::from_u128(0xC1E2), "Dana", role)
            .unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        role: Option<Role>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.token(role)));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(Role::Accountant), None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(Role::Accountant), Some(body))
            .await
    }

    async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, value) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "{value}");
        value["data"].clone()
    }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_protected_routes_require_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/v1/accounts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let request = Request::builder()
        .uri("/api/v1/accounts")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_use_envelope() {
    let app = TestApp::new().await;
    let account = app
        .create("/api/v1/accounts", json!({"name": "Chequing", "kind": "bank"}))
        .await;
    assert_eq!(account["name"], "Chequing");
    assert_eq!(decimal(&account["balance"]), Decimal::ZERO);

    let (status, body) = app.get("/api/v1/accounts?per_page=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Accounts retrieved");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["per_page"], 100);
}

#[tokio::test]
async fn test_validation_errors_are_422_with_field_messages() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/v1/accounts", json!({"name": "", "kind": "bank"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["name"].is_array());

    let (status, body) = app
        .post(
            "/api/v1/transactions",
            json!({"transaction_type": "income", "amount": "-5"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["amount"].is_array());
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let app = TestApp::new().await;
    app.create("/api/v1/accounts", json!({"name": "Till", "kind": "cash"}))
        .await;
    let (status, _) = app
        .post("/api/v1/accounts", json!({"name": "Till", "kind": "other"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_safedrop_resolution_flow() {
    let app = TestApp::new().await;
    let cash = app
        .create("/api/v1/accounts", json!({"name": "Cash", "kind": "cash"}))
        .await;
    let bank = app
        .create("/api/v1/accounts", json!({"name": "Chequing", "kind": "bank"}))
        .await;
    app.create(
        "/api/v1/transactions",
        json!({
            "transaction_type": "income",
            "amount": "500.00",
            "target_account_id": id(&cash),
            "transaction_date": "2026-03-14",
        }),
    )
    .await;
    let sale = app
        .create(
            "/api/v1/daily-sales",
            json!({
                "sale_date": "2026-03-14",
                "cash_total": "500.00",
                "card_total": "0",
                "fuel_total": "0",
                "safedrops_amount": "500.00",
            }),
        )
        .await;
    let uri = format!("/api/v1/daily-sales/{}/safedrops", id(&sale));

    let first = app
        .create(&uri, json!({"target_account_id": id(&bank), "amount": "300.00"}))
        .await;
    assert_eq!(decimal(&first["remaining"]), dec!(200));
    assert_eq!(first["state"], "partial");
    assert!(
        first["transaction"]["reference_number"]
            .as_str()
            .unwrap()
            .starts_with("SR-20260314-")
    );

    let (status, body) = app
        .post(&uri, json!({"target_account_id": id(&bank), "amount": "250.00"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["amount"][0].as_str().unwrap().contains("200"));

    let last = app
        .create(&uri, json!({"target_account_id": id(&bank), "amount": "200.00"}))
        .await;
    assert_eq!(decimal(&last["remaining"]), Decimal::ZERO);
    assert_eq!(last["state"], "resolved");

    let (_, cash) = app.get(&format!("/api/v1/accounts/{}", id(&cash))).await;
    let (_, bank) = app.get(&format!("/api/v1/accounts/{}", id(&bank))).await;
    assert_eq!(decimal(&cash["data"]["balance"]), Decimal::ZERO);
    assert_eq!(decimal(&bank["data"]["balance"]), dec!(500));

    let (status, summary) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"]["resolutions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_resolving_into_cash_account_is_rejected() {
    let app = TestApp::new().await;
    let cash = app
        .create("/api/v1/accounts", json!({"name": "Cash", "kind": "cash"}))
        .await;
    let sale = app
        .create(
            "/api/v1/daily-sales",
            json!({
                "sale_date": "2026-03-15",
                "cash_total": "200",
                "card_total": "0",
                "fuel_total": "0",
                "safedrops_amount": "200",
            }),
        )
        .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/daily-sales/{}/safedrops", id(&sale)),
            json!({"target_account_id": id(&cash), "amount": "50"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["target_account_id"].is_array());
}

#[tokio::test]
async fn test_archive_restore_and_purge() {
    let app = TestApp::new().await;
    let employee = app
        .create(
            "/api/v1/employees",
            json!({"name": "Sam", "position": "Clerk", "hourly_rate": "17.50"}),
        )
        .await;
    let base = format!("/api/v1/employees/{}", id(&employee));

    let (status, body) = app
        .call(Method::DELETE, &base, Some(Role::Clerk), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "archived");

    let (_, listed) = app.get("/api/v1/employees").await;
    assert_eq!(listed["meta"]["total"], 0);
    let (_, listed) = app.get("/api/v1/employees?with_archived=true").await;
    assert_eq!(listed["meta"]["total"], 1);
    let (_, listed) = app.get("/api/v1/employees?only_archived=true").await;
    assert_eq!(listed["meta"]["total"], 1);

    let (status, _) = app
        .call(Method::DELETE, &base, Some(Role::Clerk), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.post(&format!("{base}/restore"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");

    let (status, _) = app
        .call(Method::DELETE, &format!("{base}/force"), Some(Role::Clerk), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::DELETE, &format!("{base}/force"), Some(Role::Admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&base).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_purge_with_dependents_is_conflict() {
    let app = TestApp::new().await;
    let employee = app
        .create(
            "/api/v1/employees",
            json!({"name": "Sam", "hourly_rate": "20"}),
        )
        .await;
    app.create(
        "/api/v1/payrolls",
        json!({
            "employee_id": id(&employee),
            "period_start": "2026-03-01",
            "period_end": "2026-03-14",
            "pay_date": "2026-03-15",
            "hours_worked": "40",
            "gross_pay": "800",
            "deductions": "200",
        }),
    )
    .await;

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/v1/employees/{}/force", id(&employee)),
            Some(Role::Owner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("dependent"));
}

#[tokio::test]
async fn test_loan_overpayment_is_reported() {
    let app = TestApp::new().await;
    let loan = app
        .create(
            "/api/v1/loans",
            json!({"name": "Pump refit", "currency": "CAD", "amount": "200.00"}),
        )
        .await;

    let result = app
        .create(
            &format!("/api/v1/loans/{}/payments", id(&loan)),
            json!({"amount": "250.00", "type": "deposit", "date": "2026-03-20"}),
        )
        .await;
    assert_eq!(decimal(&result["loan"]["amount"]), Decimal::ZERO);
    assert_eq!(decimal(&result["outcome"]["overpayment"]), dec!(50));
    assert_eq!(decimal(&result["transaction"]["amount"]), dec!(250));
    assert_eq!(result["transaction"]["transaction_type"], "expense");

    let (_, payments) = app
        .get(&format!("/api/v1/loans/{}/payments", id(&loan)))
        .await;
    assert_eq!(payments["meta"]["total"], 1);
}

#[tokio::test]
async fn test_fuel_price_queues_sync_job() {
    let app = TestApp::new().await;
    let saved = app
        .create(
            "/api/v1/fuel-prices",
            json!({"effective_date": "2026-03-14", "regular": "1.5", "diesel": "1.625"}),
        )
        .await;
    let job_id = saved["sync_job_id"].as_str().unwrap().to_string();

    let (status, job) = app.get(&format!("/api/v1/sync-jobs/{job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["data"]["status"], "pending");
    assert_eq!(job["data"]["fuel_price_id"], saved["id"]);

    let (_, pending) = app.get("/api/v1/sync-jobs?status=pending").await;
    assert_eq!(pending["meta"]["total"], 1);
}

#[tokio::test]
async fn test_payroll_report() {
    let app = TestApp::new().await;
    let employee = app
        .create("/api/v1/employees", json!({"name": "Sam", "hourly_rate": "20"}))
        .await;
    app.create(
        "/api/v1/payrolls",
        json!({
            "employee_id": id(&employee),
            "period_start": "2026-03-01",
            "period_end": "2026-03-14",
            "pay_date": "2026-03-15",
            "hours_worked": "40",
            "gross_pay": "800",
            "deductions": "200",
        }),
    )
    .await;

    let (status, report) = app
        .get("/api/v1/reports/payroll?start_date=2026-03-01&end_date=2026-03-31")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["employees"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .get("/api/v1/reports/payroll?start_date=2026-03-31&end_date=2026-03-01")
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_server_error_detail_hidden_without_debug() {
    let app = TestApp::new().await;
    app.db.execute_unprepared("DROP TABLE sync_jobs").await.unwrap();

    let (status, body) = app.get("/api/v1/sync-jobs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server Error");
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert!(body.get("detail").is_none(), "{body}");
}

#[tokio::test]
async fn test_server_error_detail_exposed_in_debug() {
    let app = TestApp::with_debug(true).await;
    app.db.execute_unprepared("DROP TABLE sync_jobs").await.unwrap();

    let (status, body) = app.get("/api/v1/sync-jobs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server Error");
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Database error:"), "{detail}");
    assert!(detail.contains("sync_jobs"), "{detail}");
}

#[tokio::test]
async fn test_client_errors_unchanged_in_debug() {
    let app = TestApp::with_debug(true).await;
    let (status, body) = app
        .get(&format!("/api/v1/sync-jobs/{}", Uuid::now_v7()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
    assert!(body.get("detail").is_none(), "{body}");
}
