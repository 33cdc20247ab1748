use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::format_post_date;

// ============================================================================
// Database Models
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub image: String,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Missing fields deserialize as empty so validation reports them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBlogPostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogPostRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
}

impl UpdateBlogPostRequest {
    /// Overwrites the provided fields on `post`
    pub fn apply_to(self, post: &mut BlogPost) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(excerpt) = self.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
        if let Some(image) = self.image {
            post.image = image;
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlogPostResponse {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub image: String,
    pub published: bool,
}

impl From<&BlogPost> for BlogPostResponse {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            date: format_post_date(&post.created_at),
            image: post.image.clone(),
            published: post.published,
        }
    }
}
