use super::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::common::helpers::parse_id;
use crate::common::{ApiError, AppState};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

/// POST /api/blogs/:id/comments - Create a root comment
pub async fn create_comment(
    Extension(state): Extension<Arc<AppState>>,
    Path(blog_id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let blog_id = parse_id(&blog_id, "blog")?;
    let comment = state.comments.create_root(blog_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Comment created successfully",
            "comment": comment,
        })),
    ))
}

/// GET /api/blogs/:id/comments - Root comments with nested replies
pub async fn get_comments_by_blog(
    Extension(state): Extension<Arc<AppState>>,
    Path(blog_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let blog_id = parse_id(&blog_id, "blog")?;
    let comments = state.comments.list_for_post(blog_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "comments": comments,
    })))
}

/// GET /api/comments/:id
pub async fn get_comment(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "comment")?;
    let comment = state.comments.get_by_id(id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "comment": comment,
    })))
}

/// PUT /api/comments/:id - Update comment text
pub async fn update_comment(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "comment")?;
    let comment = state.comments.update(id, request).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Comment updated successfully",
        "comment": comment,
    })))
}

/// DELETE /api/comments/:id
pub async fn delete_comment(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "comment")?;
    state.comments.delete(id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Comment deleted successfully",
    })))
}

/// POST /api/comments/:id/reply
pub async fn create_reply(
    Extension(state): Extension<Arc<AppState>>,
    Path(parent_id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let parent_id = parse_id(&parent_id, "parent comment")?;
    let reply = state.comments.create_reply(parent_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Reply created successfully",
            "reply": reply,
        })),
    ))
}

/// GET /api/comments/:id/replies
pub async fn get_replies(
    Extension(state): Extension<Arc<AppState>>,
    Path(parent_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let parent_id = parse_id(&parent_id, "parent comment")?;
    let replies = state.comments.list_replies(parent_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "replies": replies,
    })))
}
