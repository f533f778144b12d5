//! HTTP request handlers.
//!
//! Record ids travel as `?id=` query parameters on every route.

pub mod auth;
pub mod catalog;
pub mod doctors;
pub mod health;
pub mod index;
pub mod metrics;
pub mod registrations;

pub use health::health_check;
pub use metrics::metrics_handler;

use crate::errors::HospitalError;
use crate::models::{Caller, Identity};
use crate::routes::AppState;
use crate::services::account_service;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

/// `?id=` selector shared by the get/update/delete routes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdQuery {
    pub id: String,
}

impl IdQuery {
    pub fn required(&self) -> Result<&str, HospitalError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(HospitalError::validation("id is required"));
        }
        Ok(id)
    }
}

/// JSON request body. A body that is missing, not JSON or the wrong shape is
/// a `Validation` error in the usual error envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HospitalError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(target: "hospital.handlers", status = %rejection.status(), "Request body rejected");
                Err(HospitalError::Validation(rejection.body_text()))
            }
        }
    }
}

/// The stored account behind verified claims.
pub(crate) async fn resolve_caller(
    state: &AppState,
    identity: &Identity,
) -> Result<Caller, HospitalError> {
    account_service::resolve_caller(&state.stores.accounts, identity).await
}
