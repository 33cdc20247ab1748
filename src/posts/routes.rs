use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the posts router
///
/// Reads are public; create, update, delete and publishing need a bearer token.
pub fn posts_routes() -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::get_posts).post(handlers::create_post),
        )
        .route("/api/posts/published", get(handlers::get_published_posts))
        .route(
            "/api/posts/:id",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/:id/publish", post(handlers::publish_post))
        .route("/api/posts/:id/unpublish", post(handlers::unpublish_post))
}
