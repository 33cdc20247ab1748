use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::format_comment_timestamp;

// ============================================================================
// Database Models
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub blog_post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Row to insert; the post id of a reply is always its parent's
#[derive(Debug, Clone)]
pub struct NewComment {
    pub blog_post_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub text: String,
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Body for both root comments and replies.
///
/// The owning post comes from the URL or the parent comment, so any
/// `blog_post_id` or `parent_id` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl CreateCommentRequest {
    /// Trimmed email, with blank treated as absent
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentResponse {
    pub id: i64,
    pub blog_post_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub text: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub replies: Vec<CommentResponse>,
    /// Set when deeper replies exist but were cut at the depth limit
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replies_truncated: bool,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            blog_post_id: comment.blog_post_id,
            name: comment.name.clone(),
            email: comment.email.clone(),
            text: comment.text.clone(),
            parent_id: comment.parent_id,
            created_at: format_comment_timestamp(&comment.created_at),
            replies: Vec::new(),
            replies_truncated: false,
        }
    }
}
