use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the comments router
pub fn comments_routes() -> Router {
    Router::new()
        .route(
            "/api/blogs/:id/comments",
            get(handlers::get_comments_by_blog).post(handlers::create_comment),
        )
        .route(
            "/api/comments/:id",
            get(handlers::get_comment)
                .put(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .route("/api/comments/:id/reply", post(handlers::create_reply))
        .route("/api/comments/:id/replies", get(handlers::get_replies))
}
