use crate::errors::HospitalError;
use crate::models::Registration;
use crate::repositories::store::Record;
use chrono::{DateTime, Utc};

/// Keep `department` and `departments` consistent: derive whichever is empty
/// from the other. The primary department is the first list entry.
pub fn normalize_departments(registration: &mut Registration) {
    registration.department = registration.department.trim().to_string();
    registration.departments = registration
        .departments
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if registration.departments.is_empty() && !registration.department.is_empty() {
        registration.departments = vec![registration.department.clone()];
    }
    if registration.department.is_empty() {
        if let Some(first) = registration.departments.first() {
            registration.department = first.clone();
        }
    }
}

fn is_unset(timestamp: &DateTime<Utc>) -> bool {
    *timestamp == DateTime::<Utc>::default()
}

impl Record for Registration {
    const COLLECTION: &'static str = "registrations";
    const KIND: &'static str = "registration";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.patient_id = self.patient_id.trim().to_string();
        self.doctor_id = self.doctor_id.trim().to_string();
        self.time_slot = self.time_slot.trim().to_string();
        normalize_departments(self);
    }

    fn validate(&self, _others: &[Self]) -> Result<(), HospitalError> {
        if self.patient_id.is_empty() {
            return Err(HospitalError::validation("patientId cannot be empty"));
        }
        if self.doctor_id.is_empty() {
            return Err(HospitalError::validation("doctorId cannot be empty"));
        }
        if self.departments.is_empty() {
            return Err(HospitalError::validation("departments cannot be empty"));
        }
        if is_unset(&self.visit_date) {
            return Err(HospitalError::validation("visitDate cannot be empty"));
        }
        if self.time_slot.is_empty() {
            return Err(HospitalError::validation("timeSlot cannot be empty"));
        }
        Ok(())
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        if is_unset(&self.registration_date) {
            self.registration_date = now;
        }
        self.created_at = now;
    }

    fn on_update(&mut self, previous: &Self, _now: DateTime<Utc>) {
        if is_unset(&self.registration_date) {
            self.registration_date = previous.registration_date;
        }
        self.created_at = previous.created_at;
    }
}
