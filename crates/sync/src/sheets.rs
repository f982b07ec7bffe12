//! Google Sheets `values.update` client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{StatusCode, Url};
use serde_json::json;
use tracing::{debug, warn};

use forecourt_core::pricing::{FuelPrices, SheetPlacement, sheet::row_values};

use crate::error::SyncError;
use crate::oauth::OAuthClient;

/// Destination for a day's fuel prices.
#[async_trait]
pub trait PriceSink: Send + Sync {
    /// Writes the prices of `date`, overwriting whatever that row held.
    async fn push(&self, date: NaiveDate, prices: &FuelPrices) -> Result<(), SyncError>;
}

/// Writes rows into one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    oauth: Arc<OAuthClient>,
    base_url: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Creates a client for `spreadsheet_id` behind `base_url`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        oauth: Arc<OAuthClient>,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            oauth,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Overwrites `range` with a single row of `values`.
    ///
    /// A 401 drops the cached token and retries once with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn update_row(&self, range: &str, values: Vec<String>) -> Result<(), SyncError> {
        let url = self.values_url(range)?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": [values] });

        let mut response = self.put(&url, &body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%range, "Sheets rejected the access token, refreshing");
            self.oauth.invalidate().await;
            response = self.put(&url, &body).await?;
        }

        if !response.status().is_success() {
            return Err(SyncError::from_response("sheets", response).await);
        }
        debug!(%range, "Sheet row written");
        Ok(())
    }

    async fn put(&self, url: &Url, body: &serde_json::Value) -> Result<reqwest::Response, SyncError> {
        let token = self.oauth.access_token().await?;
        Ok(self
            .http
            .put(url.clone())
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    fn values_url(&self, range: &str) -> Result<Url, SyncError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        Ok(url)
    }
}

#[async_trait]
impl PriceSink for SheetsClient {
    async fn push(&self, date: NaiveDate, prices: &FuelPrices) -> Result<(), SyncError> {
        let placement = SheetPlacement::for_date(date);
        self.update_row(&placement.range(), row_values(date, prices))
            .await
    }
}
