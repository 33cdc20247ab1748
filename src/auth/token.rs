//! Signed session tokens
//!
//! Tokens are HMAC-signed JWTs. Validation inspects the raw header before
//! anything else so a token declaring a non-HMAC algorithm (including
//! `none`) is refused regardless of what its signature segment holds.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::models::{Claims, StateClaims};
use crate::common::ServiceError;

pub const TOKEN_ISSUER: &str = "blog-auth-system";
pub const TOKEN_LIFETIME_DAYS: i64 = 7;
pub const STATE_LIFETIME_MINUTES: i64 = 10;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

trait Expiring {
    fn expires_at(&self) -> i64;
}

impl Expiring for Claims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for StateClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"***")
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str, name: &str) -> Result<String, ServiceError> {
        self.issue_at(user_id, email, name, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            email: email.to_string(),
            name: name.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, ServiceError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ServiceError> {
        self.decode_checked(token, now)
    }

    /// Wraps an OAuth state value for the browser cookie
    pub fn issue_state(&self, state: &str) -> Result<String, ServiceError> {
        self.issue_state_at(state, Utc::now())
    }

    pub fn issue_state_at(&self, state: &str, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let claims = StateClaims {
            state: state.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(STATE_LIFETIME_MINUTES)).timestamp(),
        };
        self.sign(&claims)
    }

    /// Recovers the state value from a signed state cookie
    pub fn verify_state(&self, signed_state: &str) -> Result<String, ServiceError> {
        self.verify_state_at(signed_state, Utc::now())
    }

    pub fn verify_state_at(
        &self,
        signed_state: &str,
        now: DateTime<Utc>,
    ) -> Result<String, ServiceError> {
        let claims: StateClaims = self.decode_checked(signed_state, now)?;
        Ok(claims.state)
    }

    // The secret is external state, so emptiness is checked on every use
    fn secret_bytes(&self) -> Result<&[u8], ServiceError> {
        if self.secret.trim().is_empty() {
            return Err(ServiceError::Configuration(
                "JWT_SECRET environment variable not set".to_string(),
            ));
        }
        Ok(self.secret.as_bytes())
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, ServiceError> {
        let secret = self.secret_bytes()?;
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| ServiceError::Configuration(format!("failed to sign token: {}", e)))
    }

    fn decode_checked<T>(&self, token: &str, now: DateTime<Utc>) -> Result<T, ServiceError>
    where
        T: DeserializeOwned + Expiring,
    {
        let secret = self.secret_bytes()?;
        ensure_hmac_algorithm(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = decode::<T>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(|e| ServiceError::InvalidToken(e.to_string()))?;

        if data.claims.expires_at() <= now.timestamp() {
            return Err(ServiceError::InvalidToken("token expired".to_string()));
        }

        Ok(data.claims)
    }
}

/// Reads `alg` from the unverified header and refuses anything outside HMAC.
fn ensure_hmac_algorithm(token: &str) -> Result<(), ServiceError> {
    let header_segment = token
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::InvalidToken("token has no header".to_string()))?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment.trim_end_matches('='))
        .map_err(|_| ServiceError::InvalidToken("malformed token header".to_string()))?;

    let header: RawHeader = serde_json::from_slice(&header_bytes)
        .map_err(|_| ServiceError::InvalidToken("malformed token header".to_string()))?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        other => Err(ServiceError::Security(format!(
            "unexpected signing method: {}",
            other
        ))),
    }
}
