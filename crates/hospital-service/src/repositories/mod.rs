//! Persistence layer: one [`JsonStore`] per collection.

pub mod accounts;
pub mod catalog;
pub mod patients;
pub mod registrations;
pub mod store;

pub use store::{insert_record, replace_record, JsonStore, Record};

use crate::errors::HospitalError;
use crate::models::{Account, Department, Disease, Doctor, Patient, Registration};
use std::path::Path;

/// Every collection of the service, each with its own lock.
#[derive(Clone)]
pub struct Stores {
    pub accounts: JsonStore<Account>,
    pub patients: JsonStore<Patient>,
    pub doctors: JsonStore<Doctor>,
    pub departments: JsonStore<Department>,
    pub diseases: JsonStore<Disease>,
    pub registrations: JsonStore<Registration>,
}

impl Stores {
    pub fn open(data_dir: &Path) -> Self {
        Stores {
            accounts: JsonStore::in_dir(data_dir),
            patients: JsonStore::in_dir(data_dir),
            doctors: JsonStore::in_dir(data_dir),
            departments: JsonStore::in_dir(data_dir),
            diseases: JsonStore::in_dir(data_dir),
            registrations: JsonStore::in_dir(data_dir),
        }
    }

    /// Create any missing backing documents.
    pub async fn initialize(&self) -> Result<(), HospitalError> {
        self.accounts.initialize().await?;
        self.patients.initialize().await?;
        self.doctors.initialize().await?;
        self.departments.initialize().await?;
        self.diseases.initialize().await?;
        self.registrations.initialize().await?;
        Ok(())
    }
}
