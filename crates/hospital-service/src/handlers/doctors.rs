//! Doctor writes and the doctor → diseases lookup. Doctor writes check that
//! every listed disease exists, so they bypass the generic catalog create
//! and update.

use crate::errors::HospitalError;
use crate::handlers::{IdQuery, JsonBody};
use crate::models::{Disease, Doctor};
use crate::routes::AppState;
use crate::services::catalog_service;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/doctors/createDoctor
#[instrument(skip_all, name = "hospital.handlers.create_doctor")]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    JsonBody(doctor): JsonBody<Doctor>,
) -> Result<(StatusCode, Json<Doctor>), HospitalError> {
    let created = catalog_service::create_doctor(&state.stores, doctor).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/doctors/updateDoctor?id=
#[instrument(skip_all, name = "hospital.handlers.update_doctor")]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
    JsonBody(doctor): JsonBody<Doctor>,
) -> Result<Json<Doctor>, HospitalError> {
    let updated = catalog_service::update_doctor(&state.stores, query.required()?, doctor).await?;
    Ok(Json(updated))
}

/// Handler for GET /api/doctors/getDoctorDiseases?id=
pub async fn get_doctor_diseases(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Vec<Disease>>, HospitalError> {
    let diseases = catalog_service::doctor_diseases(&state.stores, query.required()?).await?;
    Ok(Json(diseases))
}
