//! Response envelope: `{ "message", "data" }`, plus `meta` for collections.

use axum::{Json, http::StatusCode};
use serde::Serialize;

use forecourt_shared::types::{PageMeta, PageResponse};

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload.
    pub data: T,
    /// Pagination metadata for collections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// 200 with `data`.
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        message: message.into(),
        data,
        meta: None,
    })
}

/// 201 with the created record.
pub fn created<T: Serialize>(
    message: impl Into<String>,
    data: T,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(message, data))
}

/// 200 with a page of records and its metadata.
pub fn page<T: Serialize>(message: impl Into<String>, page: PageResponse<T>) -> Json<ApiResponse<Vec<T>>> {
    Json(ApiResponse {
        message: message.into(),
        data: page.data,
        meta: Some(page.meta),
    })
}
