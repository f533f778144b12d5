//! Authorization guard for protected routes.
//!
//! The session token is taken from the `Authorization` header (`Bearer`
//! prefix optional, case-insensitive) or, failing that, from the `token`
//! query parameter. A valid token whose role is not in the route group's
//! allowed set is rejected with 403; a missing or invalid token with 401.
//! On success the verified [`Identity`] is stored in request extensions.

use crate::errors::HospitalError;
use crate::models::{Identity, Role};
use crate::services::TokenService;
use axum::{
    extract::{Query, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Every role; for routes open to any authenticated caller.
pub const ANY_ROLE: &[Role] = &[Role::Patient, Role::Doctor, Role::Admin];

/// State for the authorization guard of one route group.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: TokenService,
    /// Roles admitted by this guard.
    pub allowed: &'static [Role],
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Find the session token on a request, if any.
pub fn extract_token(req: &Request) -> Option<String> {
    if let Some(header) = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        let header = header.trim();
        let token = match header.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => header.get(7..).unwrap_or(""),
            _ => header,
        };
        if let Some(token) = non_empty(token) {
            return Some(token);
        }
    }

    Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(query)| query.token)
        .and_then(|token| non_empty(&token))
}

/// Authorization guard middleware.
///
/// # Response
///
/// - 401 if the token is missing or fails verification
/// - 403 if the token's role is not allowed on this route group
/// - Continues with `Identity` in extensions otherwise
#[instrument(skip_all, name = "hospital.middleware.auth")]
pub async fn require_roles(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HospitalError> {
    let token = extract_token(&req).ok_or_else(|| {
        tracing::debug!(target: "hospital.middleware.auth", "Missing session token");
        HospitalError::InvalidToken("missing token".to_string())
    })?;

    let identity = state.tokens.verify(&token)?;

    if !state.allowed.contains(&identity.role) {
        tracing::debug!(target: "hospital.middleware.auth", role = %identity.role, "Role not allowed on route");
        return Err(HospitalError::forbidden());
    }

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
