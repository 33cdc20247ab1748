//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Reads the `Authorization: Bearer <token>` header and validates the token
/// with the shared [`TokenService`](super::token::TokenService). The identity
/// comes from the token claims, so no database lookup happens per request.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match bearer_token(&parts.headers) {
            Some(token) => token,
            None => {
                warn!("Authentication failed: missing or non-bearer Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        let claims = app_state.tokens.validate(token)?;

        debug!(
            user_id = claims.user_id,
            email = %safe_email_log(&claims.email),
            "User authentication successful via extractor"
        );

        Ok(AuthedUser {
            id: claims.user_id,
            email: claims.email,
            name: claims.name,
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header; other schemes yield None
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
