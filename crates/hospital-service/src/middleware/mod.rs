//! HTTP middleware.
//!
//! - `auth` - role-set authorization guard for protected route groups
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::{extract_token, require_roles, AuthState, ANY_ROLE};
pub use http_metrics::http_metrics_middleware;
