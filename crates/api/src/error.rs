//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Lifecycle or store error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        DomainError::Store(store_err) => match store_err {
            StoreError::ProductNotFound(_) | StoreError::OrderNotFound(_) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            StoreError::DuplicateSku(_) | StoreError::InsufficientStock { .. } => {
                (StatusCode::CONFLICT, err.to_string())
            }
            StoreError::Unavailable(_) => {
                tracing::error!(error = %err, "store unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
