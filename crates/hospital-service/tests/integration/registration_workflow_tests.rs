//! End-to-end registration workflow: ownership visibility and the doctor's
//! forward-only status changes.

use hospital_test_utils::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Two doctors with logins, two linked patients, one department.
struct Clinic {
    server: TestHospitalServer,
    admin: String,
    doctor: String,
    doctor_id: String,
    other_doctor: String,
    patient: String,
    patient_id: String,
    other_patient: String,
}

async fn link_patient(server: &TestHospitalServer, username: &str, name: &str) -> Result<(String, String), anyhow::Error> {
    let login = server.login(username, "pw").await?;
    let profile: Value = server
        .client()
        .post(server.api("/api/auth/upsertMyPatientProfile"))
        .bearer_auth(&login.token)
        .json(&patient_payload(name))
        .send()
        .await?
        .json()
        .await?;
    let patient_id = profile["patientId"].as_str().unwrap_or_default().to_string();
    Ok((login.token, patient_id))
}

async fn doctor_with_login(
    server: &TestHospitalServer,
    admin: &str,
    disease_id: &str,
    username: &str,
) -> Result<(String, String), anyhow::Error> {
    let doctor = server
        .create(admin, "/api/doctors/createDoctor", &doctor_payload(username, "内科", &[disease_id]))
        .await?;
    let doctor_id = doctor["id"].as_str().unwrap_or_default().to_string();
    let response = server
        .client()
        .post(server.api("/api/auth/assignDoctorAccount"))
        .bearer_auth(admin)
        .json(&json!({ "doctorId": doctor_id, "username": username, "password": "pw" }))
        .send()
        .await?;
    anyhow::ensure!(response.status() == StatusCode::OK, "assign failed: {}", response.status());
    let login = server.login(username, "pw").await?;
    Ok((login.token, doctor_id))
}

async fn clinic() -> Result<Clinic, anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    server
        .create(&admin, "/api/departments/createDepartment", &department_payload("内科"))
        .await?;
    let disease = server
        .create(&admin, "/api/diseases/createDisease", &disease_payload("流感"))
        .await?;
    let disease_id = disease["id"].as_str().unwrap_or_default().to_string();

    let (doctor, doctor_id) = doctor_with_login(&server, &admin, &disease_id, "dr.d").await?;
    let (other_doctor, _) = doctor_with_login(&server, &admin, &disease_id, "dr.d2").await?;
    let (patient, patient_id) = link_patient(&server, "pat.p", "病人甲").await?;
    let (other_patient, _) = link_patient(&server, "pat.p2", "病人乙").await?;

    Ok(Clinic {
        server,
        admin,
        doctor,
        doctor_id,
        other_doctor,
        patient,
        patient_id,
        other_patient,
    })
}

impl Clinic {
    async fn list(&self, token: &str) -> Result<Vec<Value>, anyhow::Error> {
        let body: Value = self
            .server
            .client()
            .get(self.server.api("/api/registrations/getRegistrations"))
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        Ok(body.as_array().cloned().unwrap_or_default())
    }

    async fn get_status(&self, token: &str, id: &str) -> Result<StatusCode, anyhow::Error> {
        Ok(self
            .server
            .client()
            .get(format!("{}?id={}", self.server.api("/api/registrations/getRegistration"), id))
            .bearer_auth(token)
            .send()
            .await?
            .status())
    }

    async fn set_status(&self, token: &str, id: &str, body: Value) -> Result<(StatusCode, Value), anyhow::Error> {
        let response = self
            .server
            .client()
            .put(format!("{}?id={}", self.server.api("/api/registrations/updateRegistration"), id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// Patient P books with doctor D.
    async fn book(&self) -> Result<Value, anyhow::Error> {
        self.server
            .create(
                &self.patient,
                "/api/registrations/createRegistration",
                &registration_payload("someone-else", &self.doctor_id),
            )
            .await
    }
}

#[tokio::test]
async fn test_patient_booking_is_pending_and_owned() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;
    let booked = clinic.book().await?;

    assert_eq!(booked["status"], "pending");
    assert_eq!(booked["patientId"], clinic.patient_id.as_str());
    assert_eq!(booked["department"], "内科");
    assert_eq!(booked["departments"], json!(["内科"]));
    assert!(booked["registrationDate"].as_str().is_some());

    Ok(())
}

#[tokio::test]
async fn test_visibility_across_roles() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;
    let booked = clinic.book().await?;
    let id = booked["id"].as_str().unwrap_or_default();

    assert_eq!(clinic.list(&clinic.admin).await?.len(), 1);
    assert_eq!(clinic.list(&clinic.doctor).await?.len(), 1);
    assert_eq!(clinic.list(&clinic.patient).await?.len(), 1);
    assert!(clinic.list(&clinic.other_doctor).await?.is_empty());
    assert!(clinic.list(&clinic.other_patient).await?.is_empty());

    assert_eq!(clinic.get_status(&clinic.doctor, id).await?, StatusCode::OK);
    assert_eq!(clinic.get_status(&clinic.other_doctor, id).await?, StatusCode::FORBIDDEN);
    assert_eq!(clinic.get_status(&clinic.other_patient, id).await?, StatusCode::FORBIDDEN);
    assert_eq!(clinic.get_status(&clinic.patient, "no-such-id").await?, StatusCode::NOT_FOUND);

    // Unlinked patient sees nothing
    let fresh = clinic.server.login("pat.new", "pw").await?;
    assert!(clinic.list(&fresh.token).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_doctor_walks_status_forward_only() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;
    let booked = clinic.book().await?;
    let id = booked["id"].as_str().unwrap_or_default();

    let (status, body) = clinic
        .set_status(&clinic.doctor, id, json!({ "status": "completed" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (status, body) = clinic
        .set_status(
            &clinic.doctor,
            id,
            json!({ "status": "confirmed", "symptoms": "rewritten", "timeSlot": "夜间" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["symptoms"], booked["symptoms"]);
    assert_eq!(body["timeSlot"], booked["timeSlot"]);
    assert_eq!(body["patientId"], booked["patientId"]);

    let (status, _) = clinic
        .set_status(&clinic.doctor, id, json!({ "status": "completed" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    for next in ["pending", "confirmed", "cancelled"] {
        let (status, _) = clinic
            .set_status(&clinic.doctor, id, json!({ "status": next }))
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "completed -> {}", next);
    }

    Ok(())
}

#[tokio::test]
async fn test_non_owning_doctor_and_patients_cannot_update() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;
    let booked = clinic.book().await?;
    let id = booked["id"].as_str().unwrap_or_default();

    let (status, _) = clinic
        .set_status(&clinic.other_doctor, id, json!({ "status": "confirmed" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Patients are not in the update route's role set at all
    let (status, _) = clinic
        .set_status(&clinic.patient, id, json!({ "status": "cancelled" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_admin_overrides_and_deletes() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;
    let booked = clinic.book().await?;
    let id = booked["id"].as_str().unwrap_or_default();

    let mut body = registration_payload(&clinic.patient_id, &clinic.doctor_id);
    body["status"] = json!("completed");
    let (status, updated) = clinic.set_status(&clinic.admin, id, body.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    body["status"] = json!("pending");
    let (status, updated) = clinic.set_status(&clinic.admin, id, body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "pending");
    assert_eq!(updated["createdAt"], booked["createdAt"]);

    let response = clinic
        .server
        .client()
        .delete(format!("{}?id={}", clinic.server.api("/api/registrations/deleteRegistration"), id))
        .bearer_auth(&clinic.patient)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = clinic
        .server
        .client()
        .delete(format!("{}?id={}", clinic.server.api("/api/registrations/deleteRegistration"), id))
        .bearer_auth(&clinic.admin)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let ack: Value = response.json().await?;
    assert_eq!(ack["message"], "Registration deleted successfully");
    assert!(clinic.list(&clinic.admin).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_doctor_cannot_book_and_unknown_department_rejected() -> Result<(), anyhow::Error> {
    let clinic = clinic().await?;

    let response = clinic
        .server
        .client()
        .post(clinic.server.api("/api/registrations/createRegistration"))
        .bearer_auth(&clinic.doctor)
        .json(&registration_payload(&clinic.patient_id, &clinic.doctor_id))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut body = registration_payload(&clinic.patient_id, &clinic.doctor_id);
    body["departments"] = json!(["眼科"]);
    let response = clinic
        .server
        .client()
        .post(clinic.server.api("/api/registrations/createRegistration"))
        .bearer_auth(&clinic.patient)
        .json(&body)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
