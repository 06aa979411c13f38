//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::StoreError;
use crate::updater::UpdateError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Version conflict: concurrent modification detected")]
    VersionConflict(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => AppError::NotFound(key),
            other => AppError::Store(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<UpdateError> for AppError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::Validation(e) => AppError::Domain(e),
            UpdateError::Conflict { key, .. } => AppError::VersionConflict(key),
            UpdateError::AlreadyExists(key) => AppError::AlreadyExists(key),
            UpdateError::Store(e) => e.into(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::NotFound(key) => (StatusCode::NOT_FOUND, "not_found", Some(key.clone())),

            // 409 Conflict
            AppError::AlreadyExists(key) => {
                (StatusCode::CONFLICT, "already_exists", Some(key.clone()))
            }
            AppError::VersionConflict(key) => {
                (StatusCode::CONFLICT, "version_conflict", Some(key.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidObservation { .. } | DomainError::NonFiniteObservation => (
                        StatusCode::BAD_REQUEST,
                        "invalid_observation",
                        Some(domain_err.to_string()),
                    ),
                    DomainError::InvalidJokeId(id) => {
                        (StatusCode::BAD_REQUEST, "invalid_joke_id", Some(id.clone()))
                    }
                    DomainError::SelfBattle(id) => {
                        (StatusCode::BAD_REQUEST, "self_battle", Some(id.clone()))
                    }
                    DomainError::CountOverflow => {
                        tracing::error!("Count overflow: {}", domain_err);
                        (StatusCode::INTERNAL_SERVER_ERROR, "count_overflow", None)
                    }
                }
            }

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                let code = match e {
                    StoreError::InvalidRecord { .. } => "invalid_record",
                    _ => "store_error",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
