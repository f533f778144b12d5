//! Test server harness for E2E testing
//!
//! Provides `TestHospitalServer` for spawning real service instances in tests.

use crate::fixtures::{ADMIN_PASSWORD, ADMIN_USERNAME, TEST_AUTH_SECRET};
use hospital_service::config::Config;
use hospital_service::models::LoginResponse;
use hospital_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Test harness for spawning the hospital service in E2E tests.
///
/// Each instance owns a fresh temporary data directory and a seeded
/// administrator (`fixtures::ADMIN_USERNAME` / `fixtures::ADMIN_PASSWORD`).
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestHospitalServer::spawn().await?;
///
///     let response = server.client().get(server.api("/health")).send().await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestHospitalServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    _data_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl TestHospitalServer {
    /// Spawn a server with the default test configuration.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn a server, overriding or adding configuration variables.
    ///
    /// The server will:
    /// - Store its documents in a fresh temporary directory
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(overrides: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let data_dir = TempDir::new()
            .map_err(|e| anyhow::anyhow!("Failed to create data directory: {}", e))?;

        let mut vars = HashMap::from([
            (
                "DATA_DIR".to_string(),
                data_dir.path().to_string_lossy().to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("AUTH_SECRET".to_string(), TEST_AUTH_SECRET.to_string()),
            ("ADMIN_USERNAME".to_string(), ADMIN_USERNAME.to_string()),
            ("ADMIN_PASSWORD".to_string(), ADMIN_PASSWORD.to_string()),
            ("BCRYPT_COST".to_string(), "10".to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(
            hospital_service::bootstrap(config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to bootstrap service: {}", e))?,
        );

        // Recorder not installed globally; each server renders its own handle
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();
        let app = routes::build_routes(state.clone(), metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            _data_dir: data_dir,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn api(&self, path: &str) -> String {
        format!("{}{}", self.url(), path)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Shared state of the running server, for direct store access.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn data_dir(&self) -> &Path {
        &self.state.config.data_dir
    }

    /// POST /api/auth/login, failing unless it answers 200.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, anyhow::Error> {
        let response = self
            .client
            .post(self.api("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("login for {} failed with {}: {}", username, status, body);
        }
        Ok(response.json().await?)
    }

    /// Token of the seeded administrator.
    pub async fn admin_token(&self) -> Result<String, anyhow::Error> {
        Ok(self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await?.token)
    }

    /// POST `body` to `path` as `token`, expecting 201, and return the
    /// created record.
    pub async fn create(&self, token: &str, path: &str, body: &Value) -> Result<Value, anyhow::Error> {
        let response = self
            .client
            .post(self.api(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("POST {} answered {}: {}", path, status, body);
        }
        Ok(response.json().await?)
    }
}

impl Drop for TestHospitalServer {
    fn drop(&mut self) {
        // Abort the server task before the data directory is removed
        self._handle.abort();
    }
}
