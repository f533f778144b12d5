//! Hospital Registration Service Library
//!
//! Backend for a hospital appointment-registration system:
//!
//! - Stateless HMAC-signed session tokens
//! - bcrypt-hashed credentials with login-or-register semantics
//! - JSON-document record stores with per-collection locking
//! - Registration workflow: ownership visibility and a forward-only status
//!   machine for doctors
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/auth.rs -> handlers/*.rs -> services/*.rs -> repositories/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `crypto` - Password hashing and payload MACs
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authorization guard and HTTP metrics
//! - `models` - Records, requests and responses
//! - `observability` - Metrics and error categories
//! - `repositories` - JSON record stores
//! - `routes` - Axum router setup
//! - `services` - Tokens, accounts, catalog and the registration workflow

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;

use config::Config;
use errors::HospitalError;
use models::Role;
use repositories::Stores;
use routes::AppState;
use secrecy::ExposeSecret;
use services::account_service;

/// Open and initialize the stores, seed the administrator when a password is
/// configured, and assemble the application state.
pub async fn bootstrap(config: Config) -> Result<AppState, HospitalError> {
    let stores = Stores::open(&config.data_dir);
    stores.initialize().await?;
    tracing::info!(target: "hospital.startup", data_dir = %config.data_dir.display(), "Record stores ready");

    match &config.admin_password {
        Some(password) => {
            let admin = account_service::ensure_account(
                &stores.accounts,
                &config.admin_username,
                password.expose_secret(),
                Role::Admin,
                config.bcrypt_cost,
            )
            .await?;
            tracing::info!(target: "hospital.startup", username = %admin.username, "Administrator account ensured");
        }
        None => {
            tracing::warn!(
                target: "hospital.startup",
                "ADMIN_PASSWORD not set; no administrator account was seeded"
            );
        }
    }

    Ok(AppState::new(config, stores))
}
