//! Registration handlers. Role gating beyond the route guard (ownership,
//! status transitions) lives in [`RegistrationWorkflow`].
//!
//! [`RegistrationWorkflow`]: crate::services::RegistrationWorkflow

use crate::errors::HospitalError;
use crate::handlers::{resolve_caller, IdQuery, JsonBody};
use crate::models::{Identity, MessageResponse, Registration, RegistrationRequest};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /api/registrations/getRegistrations
#[instrument(skip_all, name = "hospital.handlers.list_registrations")]
pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Registration>>, HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    Ok(Json(state.workflow.list_visible(&caller).await?))
}

/// Handler for GET /api/registrations/getRegistration?id=
#[instrument(skip_all, name = "hospital.handlers.get_registration")]
pub async fn get_registration(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Registration>, HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    let registration = state.workflow.get_visible(&caller, query.required()?).await?;
    Ok(Json(registration))
}

/// Handler for POST /api/registrations/createRegistration
#[instrument(skip_all, name = "hospital.handlers.create_registration")]
pub async fn create_registration(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<RegistrationRequest>,
) -> Result<(StatusCode, Json<Registration>), HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    let created = state.workflow.create(&caller, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/registrations/updateRegistration?id=
#[instrument(skip_all, name = "hospital.handlers.update_registration")]
pub async fn update_registration(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<IdQuery>,
    JsonBody(payload): JsonBody<RegistrationRequest>,
) -> Result<Json<Registration>, HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    let updated = state
        .workflow
        .update(&caller, query.required()?, payload)
        .await?;
    Ok(Json(updated))
}

/// Handler for DELETE /api/registrations/deleteRegistration?id=
#[instrument(skip_all, name = "hospital.handlers.delete_registration")]
pub async fn delete_registration(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<IdQuery>,
) -> Result<Json<MessageResponse>, HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    state.workflow.delete(&caller, query.required()?).await?;
    Ok(Json(MessageResponse::new("Registration deleted successfully")))
}
