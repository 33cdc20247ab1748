//! Authentication routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /auth/google/login` - Start Google OAuth (sets the state cookie)
/// - `GET /auth/google/callback` - Complete Google OAuth and issue a token
/// - `GET /api/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/google/login", get(handlers::google_login))
        .route("/auth/google/callback", get(handlers::google_callback))
        .route("/api/me", get(handlers::me_handler))
}
