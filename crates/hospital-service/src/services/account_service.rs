//! Account (credential) management.
//!
//! `login_or_register` deliberately treats an unknown username as a
//! self-registration: the first login for a name creates a patient account
//! with that password. There is no verification step. This is open
//! self-registration, kept as observed behavior rather than a recommendation.

use crate::crypto;
use crate::errors::HospitalError;
use crate::models::{Account, Caller, Identity, Role};
use crate::observability::metrics;
use crate::repositories::accounts::normalize_username;
use crate::repositories::{insert_record, JsonStore};
use chrono::Utc;
use tracing::instrument;

fn blank_account(username: &str, password_hash: String, role: Role) -> Account {
    let now = Utc::now();
    Account {
        id: String::new(),
        username: username.to_string(),
        password_hash,
        role,
        linked_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Trimmed, non-empty credentials or a validation error.
fn credentials(username: &str, password: &str) -> Result<(String, String), HospitalError> {
    let username = normalize_username(username);
    let password = password.trim().to_string();
    if username.is_empty() {
        return Err(HospitalError::validation("username cannot be empty"));
    }
    if password.is_empty() {
        return Err(HospitalError::validation("password cannot be empty"));
    }
    Ok((username, password))
}

/// Log in, creating a patient account on first contact.
///
/// Returns the account and whether it was just created. A wrong password
/// for an existing username is `InvalidCredentials`.
#[instrument(skip_all)]
pub async fn login_or_register(
    accounts: &JsonStore<Account>,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<(Account, bool), HospitalError> {
    let (username, password) = credentials(username, password)?;

    let result = accounts
        .mutate("login", |records| {
            if let Some(account) = records.iter_mut().find(|a| a.username == username) {
                if !crypto::verify_password(&password, &account.password_hash)? {
                    return Err(HospitalError::InvalidCredentials);
                }
                account.updated_at = Utc::now();
                return Ok((account.clone(), false));
            }

            let hash = crypto::hash_password(&password, bcrypt_cost)?;
            let account = insert_record(
                records,
                blank_account(&username, hash, Role::Patient),
                Utc::now(),
            )?;
            Ok((account, true))
        })
        .await;

    match &result {
        Ok((account, true)) => {
            metrics::record_login("registered");
            tracing::info!(target: "hospital.accounts", account_id = %account.id, "Registered patient account on first login");
        }
        Ok((_, false)) => metrics::record_login("authenticated"),
        Err(HospitalError::InvalidCredentials) => {
            metrics::record_login("rejected");
            tracing::debug!(target: "hospital.accounts", "Login rejected");
        }
        Err(_) => metrics::record_login("error"),
    }
    result
}

/// Create or re-provision the doctor-role account linked to `doctor_id`.
///
/// The caller checks that the doctor exists. A username held by any other
/// account is rejected.
#[instrument(skip_all, fields(doctor_id = %doctor_id))]
pub async fn upsert_doctor_account(
    accounts: &JsonStore<Account>,
    doctor_id: &str,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<Account, HospitalError> {
    let doctor_id = doctor_id.trim().to_string();
    if doctor_id.is_empty() {
        return Err(HospitalError::validation("doctorId cannot be empty"));
    }
    let (username, password) = credentials(username, password)?;

    accounts
        .mutate("upsert_doctor_account", |records| {
            let existing = records
                .iter()
                .position(|a| a.role == Role::Doctor && a.linked_id.as_deref() == Some(doctor_id.as_str()));

            let taken = records.iter().enumerate().any(|(index, account)| {
                account.username == username && Some(index) != existing
            });
            if taken {
                return Err(HospitalError::validation("username already exists"));
            }

            let hash = crypto::hash_password(&password, bcrypt_cost)?;
            match existing.and_then(|index| records.get_mut(index)) {
                Some(account) => {
                    account.username = username.clone();
                    account.password_hash = hash;
                    account.updated_at = Utc::now();
                    tracing::info!(target: "hospital.accounts", account_id = %account.id, "Re-provisioned doctor account");
                    Ok(account.clone())
                }
                None => {
                    let mut account = blank_account(&username, hash, Role::Doctor);
                    account.linked_id = Some(doctor_id.clone());
                    let account = insert_record(records, account, Utc::now())?;
                    tracing::info!(target: "hospital.accounts", account_id = %account.id, "Created doctor account");
                    Ok(account)
                }
            }
        })
        .await
}

/// Idempotent bootstrap: make sure `username` exists with exactly this role
/// and password. Used to seed the administrator at startup.
#[instrument(skip_all, fields(role = %role))]
pub async fn ensure_account(
    accounts: &JsonStore<Account>,
    username: &str,
    password: &str,
    role: Role,
    bcrypt_cost: u32,
) -> Result<Account, HospitalError> {
    let (username, password) = credentials(username, password)?;

    accounts
        .mutate("ensure_account", |records| {
            if let Some(account) = records.iter_mut().find(|a| a.username == username) {
                if account.role == role && crypto::verify_password(&password, &account.password_hash)? {
                    return Ok(account.clone());
                }
                account.password_hash = crypto::hash_password(&password, bcrypt_cost)?;
                account.role = role;
                account.updated_at = Utc::now();
                tracing::info!(target: "hospital.accounts", account_id = %account.id, "Reset bootstrap account");
                return Ok(account.clone());
            }

            let hash = crypto::hash_password(&password, bcrypt_cost)?;
            let account = insert_record(records, blank_account(&username, hash, role), Utc::now())?;
            tracing::info!(target: "hospital.accounts", account_id = %account.id, "Created bootstrap account");
            Ok(account)
        })
        .await
}

/// Bind an account to its domain record. A second, different binding is
/// rejected; repeating the same binding is a no-op.
#[instrument(skip_all, fields(account_id = %account_id))]
pub async fn set_linked_id(
    accounts: &JsonStore<Account>,
    account_id: &str,
    linked_id: &str,
) -> Result<Account, HospitalError> {
    let linked_id = linked_id.trim().to_string();
    if linked_id.is_empty() {
        return Err(HospitalError::validation("linkedId cannot be empty"));
    }

    accounts
        .mutate("set_linked_id", |records| {
            let account = records
                .iter_mut()
                .find(|a| a.id == account_id)
                .ok_or_else(|| HospitalError::NotFound("account not found".to_string()))?;

            match account.linked_id.as_deref().map(str::trim) {
                Some(current) if current == linked_id => return Ok(account.clone()),
                Some(current) if !current.is_empty() => {
                    return Err(HospitalError::validation("account is already linked"));
                }
                _ => {}
            }
            account.linked_id = Some(linked_id.clone());
            account.updated_at = Utc::now();
            Ok(account.clone())
        })
        .await
}

pub async fn get_by_id(accounts: &JsonStore<Account>, id: &str) -> Result<Account, HospitalError> {
    accounts.get_by_id(id).await
}

/// Resolve verified claims to the stored account. A token for an account
/// that no longer exists is an authentication failure.
pub async fn resolve_caller(
    accounts: &JsonStore<Account>,
    identity: &Identity,
) -> Result<Caller, HospitalError> {
    match accounts.find(&identity.user_id).await? {
        Some(account) => Ok(Caller::from_account(&account)),
        None => {
            tracing::debug!(target: "hospital.accounts", "Token names an unknown account");
            Err(HospitalError::invalid_token())
        }
    }
}
