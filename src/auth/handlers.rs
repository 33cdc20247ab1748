//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::{debug, warn};

use super::extractors::AuthedUser;
use super::models::{CallbackParams, UserResponse};
use super::token::TOKEN_LIFETIME_DAYS;
use crate::common::{safe_token_log, ApiError, AppState};

pub const STATE_COOKIE: &str = "oauth_state";
const STATE_COOKIE_PATH: &str = "/auth/google";

/// GET /auth/google/login
/// Starts the Google OAuth flow
///
/// The signed state travels in an HttpOnly cookie scoped to `/auth/google`
/// and is checked against the `state` query parameter on callback.
///
/// # Response
/// ```json
/// {
///   "auth_url": "https://accounts.google.com/o/oauth2/v2/auth?...",
///   "message": "Visit this URL to authenticate with Google",
///   "state": "<random state>"
/// }
/// ```
pub async fn google_login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let start = state.oauth.start()?;

    let jar = jar.add(state_cookie(start.signed_state, state.config.cookie_secure));
    let body = serde_json::json!({
        "auth_url": start.authorization_url,
        "message": "Visit this URL to authenticate with Google",
        "state": start.state,
    });

    Ok((jar, Json(body)))
}

/// GET /auth/google/callback
/// Completes the Google OAuth flow and returns a session token
///
/// The state cookie is cleared whatever the outcome.
///
/// # Response
/// ```json
/// {
///   "message": "Successfully authenticated with Google!",
///   "user": { "id": 1, "name": "...", "email": "...", "picture": "..." },
///   "token": "<jwt token>",
///   "expires": "7 days"
/// }
/// ```
pub async fn google_callback(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let signed_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(Cookie::build(STATE_COOKIE).path(STATE_COOKIE_PATH).build());

    match complete_login(&state, params, signed_state.as_deref()).await {
        Ok(body) => (jar, Json(body)).into_response(),
        Err(e) => (jar, e).into_response(),
    }
}

async fn complete_login(
    state: &AppState,
    params: CallbackParams,
    signed_state: Option<&str>,
) -> Result<serde_json::Value, ApiError> {
    if let Some(error) = params.error {
        warn!(error = %error, "Google returned an authorization error");
        return Err(ApiError::BadRequest(format!(
            "Google authorization failed: {}",
            error
        )));
    }

    let outcome = state
        .oauth
        .complete_callback(
            params.code.as_deref().unwrap_or_default(),
            params.state.as_deref().unwrap_or_default(),
            signed_state,
        )
        .await?;

    debug!(token = %safe_token_log(&outcome.token), "Issued session token");

    Ok(serde_json::json!({
        "message": "Successfully authenticated with Google!",
        "user": UserResponse::from(&outcome.user),
        "token": outcome.token,
        "expires": format!("{} days", TOKEN_LIFETIME_DAYS),
    }))
}

/// GET /api/me
/// Returns the current authenticated user's information
#[axum::debug_handler]
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .users
        .find_by_id(authed.id)
        .await
        .map_err(ApiError::DatabaseError)?;

    match user {
        Some(u) => Ok(Json(serde_json::json!({
            "success": true,
            "user": UserResponse::from(&u),
        }))),
        None => {
            warn!(user_id = authed.id, "Authenticated user no longer exists");
            Err(ApiError::Unauthorized("user not found".into()))
        }
    }
}

fn state_cookie(signed_state: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(STATE_COOKIE, signed_state);
    cookie.set_path(STATE_COOKIE_PATH);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_cookie_attributes() {
        let cookie = state_cookie("signed".to_string(), false);
        assert_eq!(cookie.name(), STATE_COOKIE);
        assert_eq!(cookie.value(), "signed");
        assert_eq!(cookie.path(), Some(STATE_COOKIE_PATH));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));

        assert_eq!(state_cookie("signed".to_string(), true).secure(), Some(true));
    }
}
