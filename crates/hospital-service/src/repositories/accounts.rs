use crate::errors::HospitalError;
use crate::models::Account;
use crate::repositories::store::Record;
use chrono::{DateTime, Utc};

/// Case-folded, trimmed form used as the unique account key.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

impl Record for Account {
    const COLLECTION: &'static str = "accounts";
    const KIND: &'static str = "account";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        self.username = normalize_username(&self.username);
        self.linked_id = self
            .linked_id
            .take()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
    }

    fn validate(&self, others: &[Self]) -> Result<(), HospitalError> {
        if self.username.is_empty() {
            return Err(HospitalError::validation("username is required"));
        }
        if self.password_hash.is_empty() {
            return Err(HospitalError::validation("password is required"));
        }
        if others.iter().any(|other| other.username == self.username) {
            return Err(HospitalError::validation("username already exists"));
        }
        Ok(())
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn on_update(&mut self, previous: &Self, now: DateTime<Utc>) {
        self.created_at = previous.created_at;
        self.updated_at = now;
    }
}
