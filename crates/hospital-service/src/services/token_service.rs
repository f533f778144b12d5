//! Stateless session tokens.
//!
//! Wire format: `base64url(json{uid,role,exp}) "." base64url(hmac_sha256(secret, payload))`
//! where the MAC covers the encoded payload text. Tokens cannot be revoked;
//! exposure is bounded only by the TTL chosen at issuance.

use crate::crypto;
use crate::errors::HospitalError;
use crate::models::{Identity, Role};
use crate::observability::{metrics, ErrorCategory};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// TTL substituted when a caller asks for a non-positive one.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    uid: String,
    role: Role,
    exp: i64,
}

/// Why a token was rejected. Only used for logs and metric labels; callers
/// always see the same generic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Malformed,
    BadSignature,
    BadPayload,
    Expired,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::BadPayload => "bad_payload",
            TokenRejection::Expired => "expired",
        }
    }
}

/// Issues and verifies session tokens with one process-wide secret.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SecretString,
}

impl TokenService {
    pub fn new(secret: SecretString) -> Self {
        TokenService { secret }
    }

    fn key(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    /// Issue a token valid for `ttl` from now.
    pub fn issue(&self, user_id: &str, role: Role, ttl: Duration) -> Result<String, HospitalError> {
        self.issue_at(user_id, role, ttl, Utc::now())
    }

    #[instrument(skip_all, fields(role = %role))]
    pub fn issue_at(
        &self,
        user_id: &str,
        role: Role,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, HospitalError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            metrics::record_token_issuance("error");
            return Err(HospitalError::validation("user id cannot be empty"));
        }
        let ttl = if ttl <= Duration::zero() {
            Duration::hours(DEFAULT_TOKEN_TTL_HOURS)
        } else {
            ttl
        };

        let Some(expires_at) = now.checked_add_signed(ttl) else {
            metrics::record_token_issuance("error");
            return Err(HospitalError::validation("token ttl out of range"));
        };

        let payload = TokenPayload {
            uid: user_id.to_string(),
            role,
            exp: expires_at.timestamp(),
        };
        let json = serde_json::to_vec(&payload).map_err(|e| {
            metrics::record_token_issuance("error");
            HospitalError::Crypto(format!("Failed to encode token payload: {}", e))
        })?;

        let encoded = URL_SAFE_NO_PAD.encode(json);
        let tag = crypto::sign_payload(self.key(), encoded.as_bytes());
        metrics::record_token_issuance("success");
        Ok(format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(tag)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Identity, HospitalError> {
        self.verify_at(token, Utc::now())
    }

    /// Every failure yields the same `InvalidToken` error.
    #[instrument(skip_all)]
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, HospitalError> {
        match self.check(token, now) {
            Ok(identity) => {
                metrics::record_token_validation("success", None);
                Ok(identity)
            }
            Err(rejection) => {
                tracing::debug!(target: "hospital.token", reason = rejection.as_str(), "Token rejected");
                let err = HospitalError::invalid_token();
                metrics::record_token_validation("error", Some(ErrorCategory::from(&err).as_str()));
                Err(err)
            }
        }
    }

    /// The rejection reason, for callers that need to tell expiry apart.
    pub fn check(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenRejection> {
        let token = token.trim();
        let mut parts = token.split('.');
        let (encoded, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(encoded), Some(signature), None)
                if !encoded.is_empty() && !signature.is_empty() =>
            {
                (encoded, signature)
            }
            _ => return Err(TokenRejection::Malformed),
        };

        let tag = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenRejection::BadSignature)?;
        if !crypto::verify_payload(self.key(), encoded.as_bytes(), &tag) {
            return Err(TokenRejection::BadSignature);
        }

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenRejection::BadPayload)?;
        let payload: TokenPayload =
            serde_json::from_slice(&json).map_err(|_| TokenRejection::BadPayload)?;
        if payload.uid.trim().is_empty() || payload.exp <= 0 {
            return Err(TokenRejection::BadPayload);
        }

        if now.timestamp() >= payload.exp {
            return Err(TokenRejection::Expired);
        }
        let expires_at = Utc
            .timestamp_opt(payload.exp, 0)
            .single()
            .ok_or(TokenRejection::BadPayload)?;

        Ok(Identity {
            user_id: payload.uid,
            role: payload.role,
            expires_at,
        })
    }
}
