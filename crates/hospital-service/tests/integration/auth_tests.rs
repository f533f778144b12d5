//! Login-or-register, session tokens and the authorization guard over HTTP.

use hospital_test_utils::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Login / Register
// ============================================================================

#[tokio::test]
async fn test_first_login_registers_patient() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;

    let first = server.login("alice", "s3cret").await?;
    assert!(first.is_new);
    assert_eq!(first.role.as_str(), "patient");
    assert_eq!(first.token.split('.').count(), 2);

    let second = server.login("alice", "s3cret").await?;
    assert!(!second.is_new);
    assert_eq!(second.id, first.id);

    Ok(())
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    server.login("alice", "s3cret").await?;

    let response = server
        .client()
        .post(server.api("/api/auth/login"))
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

#[tokio::test]
async fn test_blank_credentials_rejected() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;

    let response = server
        .client()
        .post(server.api("/api/auth/login"))
        .json(&json!({ "username": "   ", "password": "x" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_password_hash_never_plaintext_on_disk() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    server.login("carol", "plain-text-pw").await?;

    let raw = std::fs::read_to_string(server.data_dir().join("accounts.json"))?;
    assert!(!raw.contains("plain-text-pw"));
    assert!(raw.contains("passwordHash"));

    Ok(())
}

// ============================================================================
// Token handling
// ============================================================================

#[tokio::test]
async fn test_me_accepts_every_token_location() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let login = server.login("dave", "pw").await?;

    let requests = [
        server
            .client()
            .get(server.api("/api/auth/me"))
            .header("Authorization", format!("Bearer {}", login.token)),
        server
            .client()
            .get(server.api("/api/auth/me"))
            .header("Authorization", format!("bearer {}", login.token)),
        server
            .client()
            .get(server.api("/api/auth/me"))
            .header("Authorization", login.token.clone()),
        server
            .client()
            .get(format!("{}?token={}", server.api("/api/auth/me"), login.token)),
    ];

    for request in requests {
        let response = request.send().await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body["username"], "dave");
        assert_eq!(body["role"], "patient");
        assert!(body.get("passwordHash").is_none());
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_and_tampered_tokens_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let login = server.login("erin", "pw").await?;

    let response = server.client().get(server.api("/api/auth/me")).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut tampered = login.token.clone();
    let last = if tampered.ends_with('A') { "B" } else { "A" };
    tampered.pop();
    tampered.push_str(last);

    let response = server
        .client()
        .get(server.api("/api/auth/me"))
        .bearer_auth(&tampered)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");

    Ok(())
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let other = TestHospitalServer::spawn_with_vars(
        [("AUTH_SECRET".to_string(), "a-different-secret".to_string())].into(),
    )
    .await?;
    let foreign = other.login("frank", "pw").await?;

    let response = server
        .client()
        .get(server.api("/api/auth/me"))
        .bearer_auth(&foreign.token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

// ============================================================================
// Role groups
// ============================================================================

#[tokio::test]
async fn test_patient_blocked_from_admin_routes() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let patient = server.login("grace", "pw").await?;

    for path in ["/api/index", "/api/patients/getPatients"] {
        let response = server
            .client()
            .get(server.api(path))
            .bearer_auth(&patient.token)
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", path);
        let body: Value = response.json().await?;
        assert_eq!(body["error"]["message"], "forbidden");
    }

    let response = server
        .client()
        .post(server.api("/api/departments/createDepartment"))
        .bearer_auth(&patient.token)
        .json(&department_payload("内科"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_dashboard() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let response = server
        .client()
        .get(server.api("/api/index"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert!(body["patients"].as_array().is_some());
    assert!(body["doctors"].as_array().is_some());
    assert!(body["registrations"].as_array().is_some());

    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_public() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let response = server.client().get(server.api("/metrics")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

// ============================================================================
// Account binding
// ============================================================================

#[tokio::test]
async fn test_upsert_my_patient_profile_links_once() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let login = server.login("heidi", "pw").await?;

    let response = server
        .client()
        .post(server.api("/api/auth/upsertMyPatientProfile"))
        .bearer_auth(&login.token)
        .json(&patient_payload("海迪"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let first: Value = response.json().await?;
    let patient_id = first["patientId"].as_str().unwrap_or_default().to_string();
    assert!(!patient_id.is_empty());

    let mut changed = patient_payload("海迪二");
    changed["age"] = json!(35);
    let response = server
        .client()
        .post(server.api("/api/auth/upsertMyPatientProfile"))
        .bearer_auth(&login.token)
        .json(&changed)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let second: Value = response.json().await?;
    assert_eq!(second["patientId"], patient_id.as_str());
    assert_eq!(second["patient"]["name"], "海迪二");

    let me: Value = server
        .client()
        .get(server.api("/api/auth/me"))
        .bearer_auth(&login.token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(me["linkedId"], patient_id.as_str());

    Ok(())
}

#[tokio::test]
async fn test_assign_doctor_account_then_login() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    server
        .create(&admin, "/api/departments/createDepartment", &department_payload("内科"))
        .await?;
    let disease = server
        .create(&admin, "/api/diseases/createDisease", &disease_payload("流感"))
        .await?;
    let disease_id = disease["id"].as_str().unwrap_or_default();
    let doctor = server
        .create(
            &admin,
            "/api/doctors/createDoctor",
            &doctor_payload("王医生", "内科", &[disease_id]),
        )
        .await?;
    let doctor_id = doctor["id"].as_str().unwrap_or_default();

    let response = server
        .client()
        .post(server.api("/api/auth/assignDoctorAccount"))
        .bearer_auth(&admin)
        .json(&json!({ "doctorId": doctor_id, "username": "dr.wang", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let account: Value = response.json().await?;
    assert_eq!(account["role"], "doctor");
    assert_eq!(account["linkedId"], doctor_id);

    let login = server.login("dr.wang", "pw").await?;
    assert_eq!(login.role.as_str(), "doctor");
    assert!(!login.is_new);

    let response = server
        .client()
        .post(server.api("/api/auth/assignDoctorAccount"))
        .bearer_auth(&admin)
        .json(&json!({ "doctorId": "missing", "username": "dr.x", "password": "pw" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
