//! Catalog operations that reach across collections.
//!
//! Single-collection CRUD goes straight to the [`JsonStore`]; the functions
//! here add the cross-reference checks (doctor → disease ids) and the
//! read-only aggregates.

use crate::errors::HospitalError;
use crate::models::{Disease, Doctor, IndexInfo};
use crate::repositories::catalog::MAX_DOCTOR_DISEASES;
use crate::repositories::registrations::normalize_departments;
use crate::repositories::{JsonStore, Stores};
use std::collections::HashSet;
use tracing::instrument;

/// Every listed disease id must exist in the disease catalog.
async fn check_disease_ids(
    diseases: &JsonStore<Disease>,
    doctor: &Doctor,
) -> Result<(), HospitalError> {
    let requested: Vec<&str> = doctor
        .diseases
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .collect();
    if !(1..=MAX_DOCTOR_DISEASES).contains(&requested.len()) {
        return Err(HospitalError::validation(
            "diseases length must be between 1 and 3",
        ));
    }

    let known: HashSet<String> = diseases
        .read_all()
        .await?
        .into_iter()
        .map(|disease| disease.id)
        .collect();
    match requested.into_iter().find(|id| !known.contains(*id)) {
        Some(missing) => Err(HospitalError::Validation(format!(
            "disease id not found: {}",
            missing
        ))),
        None => Ok(()),
    }
}

#[instrument(skip_all)]
pub async fn create_doctor(stores: &Stores, doctor: Doctor) -> Result<Doctor, HospitalError> {
    check_disease_ids(&stores.diseases, &doctor).await?;
    let created = stores.doctors.create(doctor).await?;
    tracing::info!(target: "hospital.catalog", doctor_id = %created.id, "Doctor created");
    Ok(created)
}

#[instrument(skip_all, fields(id = %id))]
pub async fn update_doctor(
    stores: &Stores,
    id: &str,
    doctor: Doctor,
) -> Result<Doctor, HospitalError> {
    check_disease_ids(&stores.diseases, &doctor).await?;
    stores.doctors.update(id, doctor).await
}

/// Diseases treated by a doctor, in the doctor's order. Ids that no longer
/// resolve are skipped.
#[instrument(skip_all, fields(id = %doctor_id))]
pub async fn doctor_diseases(
    stores: &Stores,
    doctor_id: &str,
) -> Result<Vec<Disease>, HospitalError> {
    let doctor = stores.doctors.get_by_id(doctor_id).await?;
    let catalog = stores.diseases.read_all().await?;
    Ok(doctor
        .diseases
        .iter()
        .filter_map(|id| catalog.iter().find(|disease| &disease.id == id).cloned())
        .collect())
}

/// Admin dashboard: every patient, doctor and registration.
#[instrument(skip_all)]
pub async fn index_info(stores: &Stores) -> Result<IndexInfo, HospitalError> {
    let mut registrations = stores.registrations.read_all().await?;
    registrations.iter_mut().for_each(normalize_departments);
    Ok(IndexInfo {
        patients: stores.patients.read_all().await?,
        doctors: stores.doctors.read_all().await?,
        registrations,
    })
}
