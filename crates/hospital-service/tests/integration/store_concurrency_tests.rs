//! Concurrent writers against one collection lose nothing.

use hospital_test_utils::*;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_patient_creates_all_persist() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;
    let admin = server.admin_token().await?;

    let mut tasks = Vec::new();
    for n in 0..50 {
        let client = server.client().clone();
        let url = server.api("/api/patients/createPatient");
        let token = admin.clone();
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .bearer_auth(token)
                .json(&patient_payload(&format!("患者{}", n)))
                .send()
                .await
                .map(|response| response.status())
        }));
    }
    for task in tasks {
        assert_eq!(task.await??, StatusCode::CREATED);
    }

    let patients: Vec<Value> = server
        .client()
        .get(server.api("/api/patients/getPatients"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(patients.len(), 50);

    let ids: HashSet<&str> = patients.iter().filter_map(|p| p["id"].as_str()).collect();
    assert_eq!(ids.len(), 50);

    let on_disk: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(server.data_dir().join("patients.json"))?)?;
    assert_eq!(on_disk.len(), 50);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_logins_create_one_account() -> Result<(), anyhow::Error> {
    let server = TestHospitalServer::spawn().await?;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = server.client().clone();
        let url = server.api("/api/auth/login");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&serde_json::json!({ "username": "racer", "password": "pw" }))
                .send()
                .await
                .map(|response| response.status())
        }));
    }
    for task in tasks {
        assert_eq!(task.await??, StatusCode::OK);
    }

    let accounts = server.state().stores.accounts.read_all().await?;
    assert_eq!(accounts.iter().filter(|a| a.username == "racer").count(), 1);

    Ok(())
}
