//! Account handlers.
//!
//! - `POST /api/auth/login` - login-or-register (public)
//! - `GET /api/auth/me` - current account
//! - `POST /api/auth/assignDoctorAccount` - provision a doctor login (admin)
//! - `POST /api/auth/upsertMyPatientProfile` - own patient record (patient)

use crate::errors::HospitalError;
use crate::handlers::{resolve_caller, JsonBody};
use crate::models::{
    AccountSummary, AssignDoctorAccountRequest, Identity, LoginRequest, LoginResponse, Patient,
    PatientProfileResponse,
};
use crate::routes::AppState;
use crate::services::{account_service, profile_service};
use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /api/auth/login
///
/// Unknown usernames are registered as patients on the spot; see
/// [`account_service::login_or_register`].
#[instrument(skip_all, name = "hospital.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, HospitalError> {
    let (account, is_new) = account_service::login_or_register(
        &state.stores.accounts,
        &payload.username,
        &payload.password,
        state.config.bcrypt_cost,
    )
    .await?;

    let token = state
        .tokens
        .issue(&account.id, account.role, state.config.session_ttl())?;

    Ok(Json(LoginResponse {
        token,
        role: account.role,
        id: account.id,
        is_new,
    }))
}

/// Handler for GET /api/auth/me
#[instrument(skip_all, name = "hospital.handlers.me")]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<AccountSummary>, HospitalError> {
    let account = account_service::get_by_id(&state.stores.accounts, &identity.user_id)
        .await
        .map_err(|e| match e {
            HospitalError::NotFound(_) => HospitalError::invalid_token(),
            other => other,
        })?;
    Ok(Json(AccountSummary::from(&account)))
}

/// Handler for POST /api/auth/assignDoctorAccount
#[instrument(skip_all, name = "hospital.handlers.assign_doctor_account")]
pub async fn assign_doctor_account(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<AssignDoctorAccountRequest>,
) -> Result<Json<AccountSummary>, HospitalError> {
    let account =
        profile_service::assign_doctor_account(&state.stores, payload, state.config.bcrypt_cost)
            .await?;
    Ok(Json(AccountSummary::from(&account)))
}

/// Handler for POST /api/auth/upsertMyPatientProfile
#[instrument(skip_all, name = "hospital.handlers.upsert_my_patient_profile")]
pub async fn upsert_my_patient_profile(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(profile): JsonBody<Patient>,
) -> Result<Json<PatientProfileResponse>, HospitalError> {
    let caller = resolve_caller(&state, &identity).await?;
    let response = profile_service::upsert_my_patient_profile(&state.stores, &caller, profile).await?;
    Ok(Json(response))
}
