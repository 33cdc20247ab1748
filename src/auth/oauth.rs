//! Google login flow
//!
//! `start` mints a random state and the provider URL that carries it; the
//! signed copy of the state goes to the browser as a cookie. On callback the
//! returned state must match that cookie before the code is exchanged, the
//! profile fetched, the local user upserted and a session token issued.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{GoogleUserInfo, User};
use super::token::TokenService;
use crate::common::{safe_email_log, ExchangeError, ServiceError};

const STATE_BYTES: usize = 32;

/// Failure reported by an identity provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn authorization_url(&self, state: &str) -> String;

    /// Trades an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleUserInfo, ProviderError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, sqlx::Error>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error>;

    async fn create(&self, profile: &GoogleUserInfo) -> Result<User, sqlx::Error>;

    /// Overwrites email, name and picture
    async fn update_profile(&self, id: i64, profile: &GoogleUserInfo)
        -> Result<User, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct AuthorizationStart {
    pub state: String,
    pub authorization_url: String,
    pub signed_state: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub struct OAuthFlow {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl OAuthFlow {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        tokens: TokenService,
    ) -> Self {
        Self {
            provider,
            users,
            tokens,
        }
    }

    pub fn start(&self) -> Result<AuthorizationStart, ServiceError> {
        let state = generate_state();
        let signed_state = self.tokens.issue_state(&state)?;
        let authorization_url = self.provider.authorization_url(&state);

        debug!("Generated Google OAuth authorization URL");

        Ok(AuthorizationStart {
            state,
            authorization_url,
            signed_state,
        })
    }

    /// Completes the login. `signed_state` is the cookie set by [`start`](Self::start).
    pub async fn complete_callback(
        &self,
        code: &str,
        returned_state: &str,
        signed_state: Option<&str>,
    ) -> Result<LoginOutcome, ServiceError> {
        self.verify_state(returned_state, signed_state)?;

        if code.trim().is_empty() {
            warn!("OAuth callback without authorization code");
            return Err(ExchangeError::MissingCode.into());
        }

        let access_token = self
            .provider
            .exchange_code(code)
            .await
            .map_err(|e| match e {
                ProviderError::Rejected { .. } => ExchangeError::Rejected(e.to_string()),
                ProviderError::Transport(_) | ProviderError::Malformed(_) => {
                    ExchangeError::Unavailable(e.to_string())
                }
            })?;

        info!("Successfully exchanged authorization code for access token");

        let profile = self
            .provider
            .fetch_profile(&access_token)
            .await
            .map_err(|e| ServiceError::ProfileFetch(e.to_string()))?;

        if profile.id.trim().is_empty() || profile.email.trim().is_empty() {
            return Err(ServiceError::ProfileFetch(
                "profile missing required fields (id/email)".to_string(),
            ));
        }

        let user = self.upsert_user(&profile).await?;
        let token = self.tokens.issue(user.id, &user.email, &user.name)?;

        info!(
            user_id = user.id,
            email = %safe_email_log(&user.email),
            provider = "google",
            "User authentication successful via Google OAuth"
        );

        Ok(LoginOutcome { user, token })
    }

    fn verify_state(
        &self,
        returned_state: &str,
        signed_state: Option<&str>,
    ) -> Result<(), ServiceError> {
        let signed_state = signed_state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::InvalidState("state cookie missing".to_string()))?;

        let expected = self
            .tokens
            .verify_state(signed_state)
            .map_err(|e| match e {
                ServiceError::Configuration(_) => e,
                other => ServiceError::InvalidState(other.to_string()),
            })?;

        if returned_state.is_empty() || !constant_time_eq(returned_state, &expected) {
            return Err(ServiceError::InvalidState(
                "state parameter does not match - possible CSRF attack".to_string(),
            ));
        }

        Ok(())
    }

    /// Creates the user on first login; afterwards writes only when the profile changed.
    async fn upsert_user(&self, profile: &GoogleUserInfo) -> Result<User, ServiceError> {
        match self.users.find_by_google_id(&profile.id).await? {
            None => {
                let user = self.users.create(profile).await?;
                info!(
                    user_id = user.id,
                    email = %safe_email_log(&user.email),
                    "New user created via Google OAuth"
                );
                Ok(user)
            }
            Some(existing) if existing.differs_from(profile) => {
                let user = self.users.update_profile(existing.id, profile).await?;
                info!(
                    user_id = user.id,
                    email = %safe_email_log(&user.email),
                    "User profile updated from Google"
                );
                Ok(user)
            }
            Some(existing) => {
                debug!(user_id = existing.id, "User login - no profile updates needed");
                Ok(existing)
            }
        }
    }
}

/// 32 random bytes, URL-safe base64 without padding
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
