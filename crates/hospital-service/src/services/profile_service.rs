//! Binding accounts to their domain records.

use crate::errors::HospitalError;
use crate::models::{Account, AssignDoctorAccountRequest, Caller, Patient, PatientProfileResponse, Role};
use crate::repositories::Stores;
use crate::services::account_service;
use tracing::instrument;

/// Create the caller's patient record and bind it to the account, or update
/// the record already bound.
#[instrument(skip_all)]
pub async fn upsert_my_patient_profile(
    stores: &Stores,
    caller: &Caller,
    profile: Patient,
) -> Result<PatientProfileResponse, HospitalError> {
    if caller.role != Role::Patient {
        return Err(HospitalError::forbidden());
    }

    if let Some(patient_id) = caller.linked_id.as_deref() {
        let patient = stores.patients.update(patient_id, profile).await?;
        tracing::info!(target: "hospital.profile", patient_id = %patient.id, "Patient profile updated");
        return Ok(PatientProfileResponse {
            patient_id: patient.id.clone(),
            patient,
        });
    }

    let patient = stores.patients.create(profile).await?;
    match account_service::set_linked_id(&stores.accounts, &caller.account_id, &patient.id).await {
        Ok(account) => {
            tracing::info!(target: "hospital.profile", patient_id = %patient.id, "Patient profile created and linked");
            Ok(PatientProfileResponse {
                patient_id: account.linked_id.unwrap_or_else(|| patient.id.clone()),
                patient,
            })
        }
        Err(e) => {
            // Lost a race with another link of the same account.
            if let Err(cleanup) = stores.patients.delete(&patient.id).await {
                tracing::warn!(target: "hospital.profile", error = %cleanup, "Failed to remove unlinked patient record");
            }
            Err(e)
        }
    }
}

/// Provision the login for an existing doctor record.
#[instrument(skip_all)]
pub async fn assign_doctor_account(
    stores: &Stores,
    request: AssignDoctorAccountRequest,
    bcrypt_cost: u32,
) -> Result<Account, HospitalError> {
    let doctor_id = request.doctor_id.trim();
    if doctor_id.is_empty() || request.username.trim().is_empty() || request.password.trim().is_empty() {
        return Err(HospitalError::validation(
            "doctorId/username/password cannot be empty",
        ));
    }
    if stores.doctors.find(doctor_id).await?.is_none() {
        return Err(HospitalError::validation("doctor not found"));
    }

    account_service::upsert_doctor_account(
        &stores.accounts,
        doctor_id,
        &request.username,
        &request.password,
        bcrypt_cost,
    )
    .await
}
