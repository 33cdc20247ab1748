// src/app.rs
//! Router composition

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::common::{AppConfig, AppState};
use crate::{auth, comments, logging_middleware, posts};

const SERVICE_NAME: &str = "Blog API";

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let shared = Arc::new(state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // BLOG POST ROUTES
        // ====================================================================
        .merge(posts::posts_routes())
        // ====================================================================
        // COMMENT ROUTES
        // ====================================================================
        .merge(comments::comments_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(middleware::from_fn(logging_middleware::log_access))
        .layer(Extension(shared))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

/// GET /
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": SERVICE_NAME,
        "status": "success",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// GET /health - Pings the database
async fn health(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().timestamp();

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "database": "connected",
                "timestamp": timestamp,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "database": "unreachable",
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
