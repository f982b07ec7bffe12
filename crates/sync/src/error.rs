//! Sync error types.

use thiserror::Error;

/// Errors raised while talking to Google or draining the outbox.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Google answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Status {
        /// `oauth` or `sheets`.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The token endpoint response could not be used.
    #[error("Token refresh failed: {0}")]
    Token(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Outbox bookkeeping failed.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl SyncError {
    /// Builds a status error from a failed response, keeping at most 512 bytes of body.
    pub(crate) async fn from_response(service: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > 512 {
            let mut end = 512;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }
        Self::Status {
            service,
            status,
            body,
        }
    }
}
