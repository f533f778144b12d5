//! Observability support: metric recording and bounded error labels.
//!
//! Logging is plain `tracing`; what must never reach a log or a metric label:
//! - passwords and password hashes
//! - session tokens and the signing secret
//! - free-text patient data (symptoms, notes, national id numbers)
//!
//! Record ids and usernames are safe to log.

pub mod metrics;

use crate::errors::HospitalError;

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or out-of-range input
    Validation,
    /// Bad credentials, missing or invalid token
    Authentication,
    /// Role not permitted, not the owner, illegal transition
    Authorization,
    /// Id does not resolve
    NotFound,
    /// Storage, crypto and everything else
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&HospitalError> for ErrorCategory {
    fn from(err: &HospitalError) -> Self {
        match err {
            HospitalError::Validation(_) => ErrorCategory::Validation,
            HospitalError::InvalidCredentials | HospitalError::InvalidToken(_) => {
                ErrorCategory::Authentication
            }
            HospitalError::Forbidden(_) | HospitalError::InvalidTransition { .. } => {
                ErrorCategory::Authorization
            }
            HospitalError::NotFound(_) => ErrorCategory::NotFound,
            HospitalError::Storage(_) | HospitalError::Crypto(_) | HospitalError::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}
