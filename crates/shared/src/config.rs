//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// General application settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Google OAuth + Sheets configuration. Price sync is disabled when absent.
    #[serde(default)]
    pub google: Option<GoogleConfig>,
    /// Background sync worker configuration.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSettings {
    /// Expose internal error details in 500 responses.
    #[serde(default)]
    pub debug: bool,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    28_800 // one shift
}

/// Google OAuth client and spreadsheet settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token for the service account owner.
    pub refresh_token: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Target spreadsheet for fuel prices.
    pub spreadsheet_id: String,
    /// Sheets API base URL.
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    /// How long a fetched access token is reused.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Interval of the background token refresh.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_token_ttl() -> u64 {
    3000 // tokens live 3600s
}

fn default_refresh_interval() -> u64 {
    2700
}

/// Background sync worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between outbox polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Jobs claimed per poll.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Attempts before a job is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before retry `n`; the last entry repeats.
    #[serde(default = "default_backoff")]
    pub backoff_secs: Vec<u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff(),
        }
    }
}

fn default_poll_interval() -> u64 {
    2
}

fn default_batch_size() -> u64 {
    20
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> Vec<u64> {
    vec![5, 10, 30]
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FORECOURT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(
            [
                ("FORECOURT__DATABASE__URL", Some("postgres://localhost/forecourt")),
                ("FORECOURT__JWT__SECRET", Some("test-secret")),
                ("FORECOURT__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/forecourt");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert!(!config.app.debug);
                assert!(config.google.is_none());
                assert_eq!(config.sync.max_attempts, 3);
                assert_eq!(config.sync.backoff_secs, vec![5, 10, 30]);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database() {
        temp_env::with_vars(
            [
                ("FORECOURT__DATABASE__URL", None::<&str>),
                ("FORECOURT__JWT__SECRET", Some("test-secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
