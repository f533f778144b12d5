use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::HospitalError;
use ring::hmac;
use tracing::instrument;

/// Hash a password with bcrypt using configurable cost factor.
///
/// The salt is generated per call, so hashing the same password twice
/// yields different strings.
///
/// # Errors
///
/// Returns `HospitalError::Crypto` if:
/// - Cost is outside valid range (10-14)
/// - Bcrypt hashing fails
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, HospitalError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(HospitalError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| HospitalError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HospitalError> {
    bcrypt::verify(password, hash)
        .map_err(|e| HospitalError::Crypto(format!("Password verification failed: {}", e)))
}

/// HMAC-SHA256 tag over `payload`.
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hmac::sign(&key, payload).as_ref().to_vec()
}

/// Recomputes the tag and compares in constant time.
pub fn verify_payload(secret: &[u8], payload: &[u8], tag: &[u8]) -> bool {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hmac::verify(&key, payload, tag).is_ok()
}
