//! Deterministic request payloads.
//!
//! Every payload passes the service's validation as-is; tests mutate single
//! fields to exercise rejections.

use serde_json::{json, Value};

pub const TEST_AUTH_SECRET: &str = "hospital-test-secret";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-test-password";

/// A valid patient body; only the name varies.
pub fn patient_payload(name: &str) -> Value {
    json!({
        "name": name,
        "gender": "女",
        "age": 34,
        "phone": "13800138000",
        "idCard": "110101199003074512",
        "address": "北京市东城区",
        "emergencyContact": "王五",
        "emergencyPhone": "13900139000"
    })
}

pub fn department_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} department", name)
    })
}

pub fn disease_payload(name: &str) -> Value {
    json!({
        "name": name,
        "category": "内科",
        "description": "",
        "symptoms": "发热",
        "treatment": "休息"
    })
}

pub fn doctor_payload(name: &str, department: &str, disease_ids: &[&str]) -> Value {
    json!({
        "name": name,
        "department": department,
        "title": "主治医师",
        "introduction": "",
        "diseases": disease_ids,
        "fee": 20.0
    })
}

/// A registration body with no department: the doctor's department is used.
pub fn registration_payload(patient_id: &str, doctor_id: &str) -> Value {
    json!({
        "patientId": patient_id,
        "doctorId": doctor_id,
        "visitDate": "2025-06-01T00:00:00Z",
        "timeSlot": "上午",
        "symptoms": "头痛"
    })
}
