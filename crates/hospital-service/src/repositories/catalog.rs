//! Doctors, departments and diseases.

use crate::errors::HospitalError;
use crate::models::{Department, Disease, Doctor, WorkSchedule};
use crate::repositories::store::Record;

pub const DEFAULT_MAX_PATIENTS: i32 = 30;
pub const MAX_DOCTOR_DISEASES: usize = 3;

/// Weekdays 09:00-17:00 available, weekend unavailable.
pub fn default_work_schedule() -> Vec<WorkSchedule> {
    ["周一", "周二", "周三", "周四", "周五", "周六", "周日"]
        .into_iter()
        .enumerate()
        .map(|(index, day)| WorkSchedule {
            day_of_week: day.to_string(),
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            is_available: index < 5,
        })
        .collect()
}

impl Record for Doctor {
    const COLLECTION: &'static str = "doctors";
    const KIND: &'static str = "doctor";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.department = self.department.trim().to_string();
        self.title = self.title.trim().to_string();
        self.diseases = self
            .diseases
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if self.max_patients < 1 {
            self.max_patients = DEFAULT_MAX_PATIENTS;
        }
        if self.work_schedule.is_empty() {
            self.work_schedule = default_work_schedule();
        }
    }

    fn validate(&self, _others: &[Self]) -> Result<(), HospitalError> {
        if self.name.is_empty() {
            return Err(HospitalError::validation("name cannot be empty"));
        }
        if self.department.is_empty() {
            return Err(HospitalError::validation("department cannot be empty"));
        }
        if self.title.is_empty() {
            return Err(HospitalError::validation("title cannot be empty"));
        }
        if !(1..=MAX_DOCTOR_DISEASES).contains(&self.diseases.len()) {
            return Err(HospitalError::validation(
                "diseases length must be between 1 and 3",
            ));
        }
        if !self.fee.is_finite() || self.fee < 0.0 {
            return Err(HospitalError::validation("fee must be >= 0"));
        }
        Ok(())
    }
}

impl Record for Department {
    const COLLECTION: &'static str = "departments";
    const KIND: &'static str = "department";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn validate(&self, others: &[Self]) -> Result<(), HospitalError> {
        if self.name.is_empty() {
            return Err(HospitalError::validation("name cannot be empty"));
        }
        if others.iter().any(|other| other.name == self.name) {
            return Err(HospitalError::validation("department name already exists"));
        }
        Ok(())
    }
}

impl Record for Disease {
    const COLLECTION: &'static str = "diseases";
    const KIND: &'static str = "disease";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
    }

    fn validate(&self, _others: &[Self]) -> Result<(), HospitalError> {
        if self.name.is_empty() {
            return Err(HospitalError::validation("name cannot be empty"));
        }
        if self.category.is_empty() {
            return Err(HospitalError::validation("category cannot be empty"));
        }
        Ok(())
    }
}
