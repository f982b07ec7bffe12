//! Spreadsheet sync for fuel prices.
//!
//! This crate provides:
//! - `OAuthClient`: refresh-token grant with a cached access token
//! - `SheetsClient`: Google Sheets `values.update` writes
//! - `SyncWorker`: drains the `sync_jobs` outbox with bounded retries

pub mod error;
pub mod oauth;
pub mod sheets;
pub mod worker;

pub use error::SyncError;
pub use oauth::{OAuthClient, OAuthSettings};
pub use sheets::{PriceSink, SheetsClient};
pub use worker::{SyncWorker, WorkerStats, spawn_token_refresher};

use std::time::Duration;

/// Builds the HTTP client shared by the Google clients.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client() -> Result<reqwest::Client, SyncError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("forecourt/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SyncError::Http)
}
