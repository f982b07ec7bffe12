//! OAuth2 refresh-token grant with a cached access token.
//!
//! The client is built once at startup and shared. Access tokens are cached
//! for a fixed TTL shorter than Google's expiry; a background task calls
//! [`OAuthClient::force_refresh`] periodically so the worker rarely waits on
//! the token endpoint.

use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, info};

use forecourt_shared::config::GoogleConfig;

use crate::error::SyncError;

const TOKEN_KEY: &str = "access_token";

/// Credentials for the refresh-token grant.
#[derive(Clone)]
pub struct OAuthSettings {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token endpoint.
    pub token_url: String,
    /// How long an access token is reused.
    pub token_ttl: Duration,
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[hidden]")
            .field("refresh_token", &"[hidden]")
            .field("token_url", &self.token_url)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl From<&GoogleConfig> for OAuthSettings {
    fn from(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            token_url: config.token_url.clone(),
            token_ttl: Duration::from_secs(config.token_ttl_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth client issuing access tokens for Google APIs.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    settings: OAuthSettings,
    cache: Cache<&'static str, String>,
}

impl OAuthClient {
    /// Creates a client. No request is made until a token is needed.
    #[must_use]
    pub fn new(http: reqwest::Client, settings: OAuthSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(settings.token_ttl)
            .build();
        Self {
            http,
            settings,
            cache,
        }
    }

    /// Returns a cached access token, fetching a new one when it has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint call fails.
    pub async fn access_token(&self) -> Result<String, SyncError> {
        self.cache
            .try_get_with(TOKEN_KEY, self.fetch())
            .await
            .map_err(|e| SyncError::Token(e.to_string()))
    }

    /// Fetches a fresh token and replaces the cached one.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint call fails. The cached token is
    /// left in place.
    pub async fn force_refresh(&self) -> Result<(), SyncError> {
        let token = self.fetch().await?;
        self.cache.insert(TOKEN_KEY, token).await;
        info!("Google access token refreshed");
        Ok(())
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        self.cache.invalidate(TOKEN_KEY).await;
    }

    async fn fetch(&self) -> Result<String, SyncError> {
        debug!(token_url = %self.settings.token_url, "Requesting Google access token");

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("refresh_token", self.settings.refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::from_response("oauth", response).await);
        }

        let body: TokenResponse = response.json().await?;
        if body.access_token.is_empty() {
            return Err(SyncError::Token("empty access token".to_string()));
        }
        Ok(body.access_token)
    }
}
