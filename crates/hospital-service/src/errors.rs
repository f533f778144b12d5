//! Hospital service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl.
//! Authentication and authorization failures carry generic messages so a
//! client cannot learn which check rejected it. Storage and crypto failures
//! never expose filesystem or key details; the real cause is logged server-side.

use crate::models::RegistrationStatus;
use crate::observability::{metrics, ErrorCategory};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HospitalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl HospitalError {
    /// Generic rejection used for every token failure.
    pub fn invalid_token() -> Self {
        HospitalError::InvalidToken("The session token is invalid or expired".to_string())
    }

    /// Generic rejection used for role and ownership failures.
    pub fn forbidden() -> Self {
        HospitalError::Forbidden("forbidden".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HospitalError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HospitalError::Validation(_) => StatusCode::BAD_REQUEST,
            HospitalError::InvalidCredentials | HospitalError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            HospitalError::Forbidden(_) | HospitalError::InvalidTransition { .. } => {
                StatusCode::FORBIDDEN
            }
            HospitalError::NotFound(_) => StatusCode::NOT_FOUND,
            HospitalError::Storage(_) | HospitalError::Crypto(_) | HospitalError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<std::io::Error> for HospitalError {
    fn from(err: std::io::Error) -> Self {
        HospitalError::Storage(format!("I/O failure: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for HospitalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        metrics::record_error(
            "http_response",
            ErrorCategory::from(&self).as_str(),
            status.as_u16(),
        );
        let (code, message) = match &self {
            HospitalError::Validation(detail) => ("VALIDATION_ERROR", detail.clone()),
            HospitalError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            HospitalError::InvalidToken(reason) => ("INVALID_TOKEN", reason.clone()),
            HospitalError::Forbidden(_) => ("FORBIDDEN", "forbidden".to_string()),
            HospitalError::InvalidTransition { from, to } => (
                "INVALID_TRANSITION",
                format!("invalid status transition: {} -> {}", from, to),
            ),
            HospitalError::NotFound(what) => ("NOT_FOUND", what.clone()),
            HospitalError::Storage(detail) => {
                tracing::error!(target: "hospital.errors", detail = %detail, "Storage failure");
                (
                    "STORAGE_ERROR",
                    "An internal storage error occurred".to_string(),
                )
            }
            HospitalError::Crypto(detail) => {
                tracing::error!(target: "hospital.errors", detail = %detail, "Crypto failure");
                (
                    "CRYPTO_ERROR",
                    "An internal cryptographic error occurred".to_string(),
                )
            }
            HospitalError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
