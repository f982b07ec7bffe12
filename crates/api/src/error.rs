//! Maps domain errors to JSON error responses.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use forecourt_db::repositories::{RecordError, SafedropRepoError};
use forecourt_shared::AppError;

use crate::AppState;

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Internal detail of a 500 response, attached for [`expose_error_detail`].
#[derive(Debug, Clone)]
struct ErrorDetail(String);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self(err.into())
    }
}

impl From<SafedropRepoError> for ApiError {
    fn from(err: SafedropRepoError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
            let mut response = (
                status,
                Json(json!({
                    "message": "Server Error",
                    "error": self.0.error_code(),
                })),
            )
                .into_response();
            response
                .extensions_mut()
                .insert(ErrorDetail(self.0.to_string()));
            return response;
        }

        let body = match self.0 {
            AppError::Validation { message, fields } => json!({
                "message": message,
                "errors": fields,
            }),
            other => json!({
                "message": other.to_string(),
                "error": other.error_code(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Adds the internal error detail to 500 responses when `app.debug` is on.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.debug {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    (
        response.status(),
        Json(json!({
            "message": "Server Error",
            "error": "INTERNAL_ERROR",
            "detail": detail,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecourt_core::lifecycle::LifecycleError;
    use forecourt_core::safedrop::SafedropError;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[rstest]
    #[case(RecordError::not_found("Account", Uuid::nil()).into(), StatusCode::NOT_FOUND)]
    #[case(RecordError::Duplicate("taken".into()).into(), StatusCode::CONFLICT)]
    #[case(RecordError::invalid("name", "bad").into(), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(RecordError::from(LifecycleError::HasDependents(2)).into(), StatusCode::CONFLICT)]
    #[case(SafedropRepoError::NoCashAccount.into(), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(AppError::Forbidden("no".into()).into(), StatusCode::FORBIDDEN)]
    #[case(AppError::Database("boom".into()).into(), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] error: ApiError, #[case] status: StatusCode) {
        assert_eq!(error.into_response().status(), status);
    }

    #[test]
    fn test_over_allocation_names_amount_field() {
        let error = ApiError::from(SafedropRepoError::Rule(SafedropError::OverAllocation {
            requested: dec!(250),
            remaining: dec!(200),
        }));
        match error.0 {
            AppError::Validation { fields, .. } => assert!(fields.contains_key("amount")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_body_omits_detail() {
        let response = ApiError(AppError::Database("connection reset".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let ErrorDetail(detail) = response.extensions().get::<ErrorDetail>().cloned().unwrap();
        assert_eq!(detail, "Database error: connection reset");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "Server Error", "error": "DATABASE_ERROR"}));
    }
}
