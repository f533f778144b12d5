//! Registration workflow: ownership visibility and role-gated status changes.
//!
//! - admin: sees and edits everything, status included, without the
//!   transition table
//! - doctor: sees registrations naming their doctor record; may change only
//!   the status, along the forward transition table
//! - patient: sees registrations naming their patient record; may create for
//!   themself only, always as `pending`
//!
//! Patient and doctor references are checked against their own stores without
//! holding those stores' locks, so a referenced record deleted between the
//! check and the registration write is not detected.

use crate::config::DepartmentValidation;
use crate::errors::HospitalError;
use crate::models::{Caller, Registration, RegistrationRequest, RegistrationStatus, Role};
use crate::observability::metrics;
use crate::repositories::registrations::normalize_departments;
use crate::repositories::{replace_record, Stores};
use chrono::Utc;
use std::collections::HashSet;
use tracing::instrument;

/// Whether `caller` may see `registration`.
pub fn is_visible(caller: &Caller, registration: &Registration) -> bool {
    let linked = match (caller.role, caller.linked_id.as_deref()) {
        (Role::Admin, _) => return true,
        (_, None) => return false,
        (_, Some(linked)) => linked,
    };
    match caller.role {
        Role::Doctor => registration.doctor_id == linked,
        Role::Patient => registration.patient_id == linked,
        Role::Admin => true,
    }
}

pub fn filter_visible(caller: &Caller, registrations: Vec<Registration>) -> Vec<Registration> {
    registrations
        .into_iter()
        .filter(|registration| is_visible(caller, registration))
        .collect()
}

fn parse_status(request: &RegistrationRequest) -> Result<Option<RegistrationStatus>, HospitalError> {
    request.requested_status().map_err(HospitalError::Validation)
}

#[derive(Clone)]
pub struct RegistrationWorkflow {
    stores: Stores,
    department_validation: DepartmentValidation,
}

impl RegistrationWorkflow {
    pub fn new(stores: Stores, department_validation: DepartmentValidation) -> Self {
        RegistrationWorkflow {
            stores,
            department_validation,
        }
    }

    fn checks_departments(&self, caller: &Caller) -> bool {
        if caller.is_admin() {
            self.department_validation.applies_to_admin()
        } else {
            self.department_validation.applies_to_non_admin()
        }
    }

    /// Admins get everything; an unlinked patient or doctor gets nothing.
    #[instrument(skip_all, fields(role = %caller.role))]
    pub async fn list_visible(&self, caller: &Caller) -> Result<Vec<Registration>, HospitalError> {
        let mut registrations = self.stores.registrations.read_all().await?;
        registrations.iter_mut().for_each(normalize_departments);
        Ok(filter_visible(caller, registrations))
    }

    /// `NotFound` when the id does not resolve, `Forbidden` when it does but
    /// the caller does not own it.
    #[instrument(skip_all, fields(role = %caller.role, id = %id))]
    pub async fn get_visible(&self, caller: &Caller, id: &str) -> Result<Registration, HospitalError> {
        let mut registration = self.stores.registrations.get_by_id(id).await?;
        if !is_visible(caller, &registration) {
            tracing::debug!(target: "hospital.registrations", "Registration read denied");
            return Err(HospitalError::forbidden());
        }
        normalize_departments(&mut registration);
        Ok(registration)
    }

    #[instrument(skip_all, fields(role = %caller.role))]
    pub async fn create(
        &self,
        caller: &Caller,
        mut request: RegistrationRequest,
    ) -> Result<Registration, HospitalError> {
        let status = match caller.role {
            Role::Admin => parse_status(&request)?.unwrap_or_default(),
            Role::Patient => {
                let linked = caller
                    .linked_id
                    .clone()
                    .ok_or_else(|| HospitalError::validation("patient profile not linked"))?;
                request.patient_id = linked;
                RegistrationStatus::Pending
            }
            Role::Doctor => return Err(HospitalError::forbidden()),
        };

        let mut registration = request.into_registration(status);
        self.resolve_references(caller, &mut registration).await?;

        let created = self.stores.registrations.create(registration).await?;
        tracing::info!(target: "hospital.registrations", id = %created.id, status = %created.status, "Registration created");
        Ok(created)
    }

    #[instrument(skip_all, fields(role = %caller.role, id = %id))]
    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        request: RegistrationRequest,
    ) -> Result<Registration, HospitalError> {
        match caller.role {
            Role::Admin => self.admin_update(caller, id, request).await,
            Role::Doctor => self.doctor_update(caller, id, request).await,
            Role::Patient => {
                // Unknown ids still answer NotFound.
                self.stores.registrations.get_by_id(id).await?;
                Err(HospitalError::forbidden())
            }
        }
    }

    /// Full override. Omitted status keeps the stored one.
    async fn admin_update(
        &self,
        caller: &Caller,
        id: &str,
        request: RegistrationRequest,
    ) -> Result<Registration, HospitalError> {
        let existing = self.stores.registrations.get_by_id(id).await?;
        let status = parse_status(&request)?.unwrap_or(existing.status);

        let mut registration = request.into_registration(status);
        self.resolve_references(caller, &mut registration).await?;

        let updated = self.stores.registrations.update(id, registration).await?;
        if updated.status != existing.status {
            metrics::record_registration_transition("override");
        }
        tracing::info!(target: "hospital.registrations", from = %existing.status, to = %updated.status, "Registration updated by admin");
        Ok(updated)
    }

    /// Status-only change by the registration's own doctor. Every other field
    /// is taken from the stored record whatever the body says. The ownership
    /// and transition checks run under the collection's write lock.
    async fn doctor_update(
        &self,
        caller: &Caller,
        id: &str,
        request: RegistrationRequest,
    ) -> Result<Registration, HospitalError> {
        let requested = parse_status(&request)?;

        let result = self
            .stores
            .registrations
            .mutate("update", |records| {
                let existing = records
                    .iter()
                    .find(|r| r.id == id)
                    .cloned()
                    .ok_or_else(|| HospitalError::NotFound("registration not found".to_string()))?;

                if !is_visible(caller, &existing) {
                    return Err(HospitalError::forbidden());
                }

                let next = requested.unwrap_or(existing.status);
                if !existing.status.can_transition_to(next) {
                    return Err(HospitalError::InvalidTransition {
                        from: existing.status,
                        to: next,
                    });
                }

                let mut registration = existing.clone();
                registration.status = next;
                let updated = replace_record(records, id, registration, Utc::now())?;
                Ok((existing.status, updated))
            })
            .await;

        match result {
            Ok((from, updated)) => {
                let outcome = if from == updated.status { "unchanged" } else { "applied" };
                metrics::record_registration_transition(outcome);
                tracing::info!(target: "hospital.registrations", from = %from, to = %updated.status, "Registration status changed by doctor");
                Ok(updated)
            }
            Err(e) => {
                if matches!(e, HospitalError::InvalidTransition { .. }) {
                    metrics::record_registration_transition("rejected");
                }
                Err(e)
            }
        }
    }

    /// Admin-only removal; absent ids are a no-op.
    #[instrument(skip_all, fields(role = %caller.role, id = %id))]
    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<bool, HospitalError> {
        if !caller.is_admin() {
            return Err(HospitalError::forbidden());
        }
        let removed = self.stores.registrations.delete(id).await?;
        tracing::info!(target: "hospital.registrations", removed, "Registration delete");
        Ok(removed)
    }

    /// Check patient and doctor exist, settle the department pair (falling
    /// back to the doctor's department) and apply the department policy.
    async fn resolve_references(
        &self,
        caller: &Caller,
        registration: &mut Registration,
    ) -> Result<(), HospitalError> {
        registration.patient_id = registration.patient_id.trim().to_string();
        registration.doctor_id = registration.doctor_id.trim().to_string();
        if registration.patient_id.is_empty() {
            return Err(HospitalError::validation("patientId cannot be empty"));
        }
        if registration.doctor_id.is_empty() {
            return Err(HospitalError::validation("doctorId cannot be empty"));
        }

        if self
            .stores
            .patients
            .find(&registration.patient_id)
            .await?
            .is_none()
        {
            return Err(HospitalError::validation("patient not found"));
        }
        let doctor = self
            .stores
            .doctors
            .find(&registration.doctor_id)
            .await?
            .ok_or_else(|| HospitalError::validation("doctor not found"))?;

        normalize_departments(registration);
        if registration.departments.is_empty() {
            let fallback = doctor.department.trim();
            if fallback.is_empty() {
                return Err(HospitalError::validation("departments cannot be empty"));
            }
            registration.department = fallback.to_string();
            registration.departments = vec![fallback.to_string()];
        }

        if self.checks_departments(caller) {
            let known: HashSet<String> = self
                .stores
                .departments
                .read_all()
                .await?
                .into_iter()
                .map(|department| department.name)
                .collect();
            if let Some(missing) = registration
                .departments
                .iter()
                .find(|name| !known.contains(name.as_str()))
            {
                return Err(HospitalError::Validation(format!(
                    "department not found: {}",
                    missing
                )));
            }
        }
        Ok(())
    }
}
