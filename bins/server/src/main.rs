//! Forecourt API Server
//!
//! Serves the REST API and, when Google credentials are configured, runs the
//! fuel price sync worker and the token refresher next to it.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::{net::TcpListener, sync::watch, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use forecourt_api::{AppState, create_router};
use forecourt_db::{SyncJobRepository, connect_with_pool, migration::Migrator};
use forecourt_shared::{AppConfig, JwtConfig, JwtService, config::GoogleConfig};
use forecourt_sync::{
    OAuthClient, OAuthSettings, SheetsClient, SyncWorker, http_client, spawn_token_refresher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .context("jwt.access_token_expiry_secs is out of range")?,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let background = match &config.google {
        Some(google) => start_price_sync(&config, google, &db, shutdown_rx)?,
        None => {
            warn!("Google settings missing, fuel price sync disabled");
            Vec::new()
        }
    };

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        debug: config.app.debug,
    };
    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopping background tasks");
    shutdown_tx.send_replace(true);
    for handle in background {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }

    Ok(())
}

/// Env filter from `RUST_LOG`; JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "forecourt=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Builds the Google clients once and spawns the worker and the token refresher.
fn start_price_sync(
    config: &AppConfig,
    google: &GoogleConfig,
    db: &DatabaseConnection,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let http = http_client().context("Failed to build HTTP client")?;
    let oauth = Arc::new(OAuthClient::new(http.clone(), OAuthSettings::from(google)));
    let sheets = SheetsClient::new(
        http,
        oauth.clone(),
        google.sheets_base_url.clone(),
        google.spreadsheet_id.clone(),
    );

    let worker = SyncWorker::from_config(
        SyncJobRepository::new(db.clone()),
        Arc::new(sheets),
        &config.sync,
    );
    info!(spreadsheet_id = %google.spreadsheet_id, "Fuel price sync enabled");

    Ok(vec![
        worker.spawn(shutdown.clone()),
        spawn_token_refresher(
            oauth,
            Duration::from_secs(google.refresh_interval_secs),
            shutdown,
        ),
    ])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
