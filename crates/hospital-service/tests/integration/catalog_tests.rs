//! Catalog CRUD over HTTP: patients, doctors, departments, diseases.

use hospital_test_utils::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_department_crud() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let created = server
        .create(&admin, "/api/departments/createDepartment", &department_payload("内科"))
        .await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    // Natural key is unique
    let response = server
        .client()
        .post(server.api("/api/departments/createDepartment"))
        .bearer_auth(&admin)
        .json(&department_payload(" 内科 "))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client()
        .put(format!("{}?id={}", server.api("/api/departments/updateDepartment"), id))
        .bearer_auth(&admin)
        .json(&json!({ "name": "心内科", "description": "renamed" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Any role may read
    let patient = server.login("reader", "pw").await?;
    let fetched: Value = server
        .client()
        .get(format!("{}?id={}", server.api("/api/departments/getDepartment"), id))
        .bearer_auth(&patient.token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched["name"], "心内科");

    let response = server
        .client()
        .delete(format!("{}?id={}", server.api("/api/departments/deleteDepartment"), id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Department deleted successfully");

    let response = server
        .client()
        .get(format!("{}?id={}", server.api("/api/departments/getDepartment"), id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_patient_validation_errors_surface() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let cases = [
        ("age", json!(0), "age must be between 1 and 150"),
        ("gender", json!("X"), "gender must be 男 or 女"),
        ("phone", json!("1380013800"), "phone must be 11 digits"),
        ("idCard", json!("123"), "invalid id card number"),
    ];
    for (field, value, message) in cases {
        let mut body = patient_payload("患者");
        body[field] = value;
        let response = server
            .client()
            .post(server.api("/api/patients/createPatient"))
            .bearer_auth(&admin)
            .json(&body)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", field);
        let error: Value = response.json().await?;
        assert_eq!(error["error"]["message"], message);
    }

    let created = server
        .create(&admin, "/api/patients/createPatient", &patient_payload("患者"))
        .await?;
    assert!(created["createdAt"].as_str().is_some());

    Ok(())
}

#[tokio::test]
async fn test_doctor_defaults_and_disease_lookup() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let flu = server
        .create(&admin, "/api/diseases/createDisease", &disease_payload("流感"))
        .await?;
    let flu_id = flu["id"].as_str().unwrap_or_default();

    let response = server
        .client()
        .post(server.api("/api/doctors/createDoctor"))
        .bearer_auth(&admin)
        .json(&doctor_payload("李医生", "内科", &["ghost"]))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await?;
    assert_eq!(error["error"]["message"], "disease id not found: ghost");

    let doctor = server
        .create(&admin, "/api/doctors/createDoctor", &doctor_payload("李医生", "内科", &[flu_id]))
        .await?;
    assert_eq!(doctor["maxPatients"], 30);
    let schedule = doctor["workSchedule"].as_array().cloned().unwrap_or_default();
    assert_eq!(schedule.len(), 7);
    assert_eq!(schedule.iter().filter(|day| day["isAvailable"] == true).count(), 5);

    let doctor_id = doctor["id"].as_str().unwrap_or_default();
    let diseases: Value = server
        .client()
        .get(format!("{}?id={}", server.api("/api/doctors/getDoctorDiseases"), doctor_id))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(diseases[0]["name"], "流感");

    Ok(())
}

#[tokio::test]
async fn test_missing_id_rejected() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let response = server
        .client()
        .get(server.api("/api/doctors/getDoctor"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server
        .client()
        .get(format!("{}?id=nope", server.api("/api/doctors/getDoctor")))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let response = server
        .client()
        .post(server.api("/api/departments/createDepartment"))
        .bearer_auth(&admin)
        .header("Content-Type", "application/json")
        .body("{\"name\": ")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = response.json().await?;
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}
