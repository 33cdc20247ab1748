use super::models::{CreateBlogPostRequest, UpdateBlogPostRequest};
use crate::auth::AuthedUser;
use crate::common::helpers::parse_id;
use crate::common::{safe_email_log, ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /api/posts - All live posts, newest first
pub async fn get_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.list().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "posts": posts,
    })))
}

/// GET /api/posts/published
pub async fn get_published_posts(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.published().await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "posts": posts,
    })))
}

/// GET /api/posts/:id
pub async fn get_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "post")?;
    let post = state.posts.get(id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "post": post,
    })))
}

// ============================================================================
// Authenticated Handlers
// ============================================================================

/// POST /api/posts
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateBlogPostRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.create(request).await?;

    info!(
        user_id = user.id,
        user_name = %user.name,
        email = %safe_email_log(&user.email),
        post_id = %post.id,
        "Post created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Post created successfully",
            "post": post,
        })),
    ))
}

/// PUT /api/posts/:id - Partial update
pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateBlogPostRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "post")?;
    let post = state.posts.update(id, request).await?;

    info!(
        user_id = user.id,
        email = %safe_email_log(&user.email),
        post_id = id,
        "Post updated via API"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Post updated successfully",
        "post": post,
    })))
}

/// DELETE /api/posts/:id
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "post")?;
    state.posts.delete(id).await?;

    info!(
        user_id = user.id,
        email = %safe_email_log(&user.email),
        post_id = id,
        "Post deleted via API"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Post deleted successfully",
    })))
}

/// POST /api/posts/:id/publish
pub async fn publish_post(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "post")?;
    let post = state.posts.publish(id).await?;

    info!(
        user_id = user.id,
        email = %safe_email_log(&user.email),
        post_id = id,
        "Post published via API"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Post published successfully",
        "post": post,
    })))
}

/// POST /api/posts/:id/unpublish
pub async fn unpublish_post(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "post")?;
    let post = state.posts.unpublish(id).await?;

    info!(
        user_id = user.id,
        email = %safe_email_log(&user.email),
        post_id = id,
        "Post unpublished via API"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Post unpublished successfully",
        "post": post,
    })))
}
