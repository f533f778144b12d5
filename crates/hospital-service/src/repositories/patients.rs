use crate::errors::HospitalError;
use crate::models::Patient;
use crate::repositories::store::Record;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// 18-character mainland resident id: region, birth date, sequence, check digit.
static ID_CARD_PATTERN: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^[1-9]\d{5}(18|19|[23]\d)\d{2}(0[1-9]|10|11|12)([0-2][1-9]|10|20|30|31)\d{3}[0-9xX]$",
    )
});

const GENDERS: [&str; 2] = ["男", "女"];

pub fn is_valid_id_card(id_card: &str) -> Result<bool, HospitalError> {
    match ID_CARD_PATTERN.as_ref() {
        Ok(pattern) => Ok(pattern.is_match(id_card)),
        Err(e) => {
            tracing::error!(target: "hospital.patients", error = %e, "Id card pattern failed to compile");
            Err(HospitalError::Internal)
        }
    }
}

impl Record for Patient {
    const COLLECTION: &'static str = "patients";
    const KIND: &'static str = "patient";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn normalize(&mut self) {
        for field in [
            &mut self.name,
            &mut self.gender,
            &mut self.phone,
            &mut self.id_card,
            &mut self.address,
            &mut self.emergency_contact,
            &mut self.emergency_phone,
        ] {
            *field = field.trim().to_string();
        }
    }

    fn validate(&self, _others: &[Self]) -> Result<(), HospitalError> {
        if self.name.is_empty() {
            return Err(HospitalError::validation("patient name is required"));
        }
        if !(1..=150).contains(&self.age) {
            return Err(HospitalError::validation("age must be between 1 and 150"));
        }
        if !GENDERS.contains(&self.gender.as_str()) {
            return Err(HospitalError::validation("gender must be 男 or 女"));
        }
        if self.phone.len() != 11 || !self.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(HospitalError::validation("phone must be 11 digits"));
        }
        if !is_valid_id_card(&self.id_card)? {
            return Err(HospitalError::validation("invalid id card number"));
        }
        if self.address.is_empty() {
            return Err(HospitalError::validation("address is required"));
        }
        if self.emergency_contact.is_empty() {
            return Err(HospitalError::validation("emergency contact is required"));
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
