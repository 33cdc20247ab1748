use std::sync::Arc;
use tracing::info;

use super::models::{BlogPostResponse, CreateBlogPostRequest, UpdateBlogPostRequest};
use super::repository::PostStore;
use crate::common::{ServiceError, Validator};

pub struct PostService {
    posts: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    // ============================================================================
    // Blog Post CRUD Operations
    // ============================================================================

    /// Create a new post; posts start unpublished
    pub async fn create(
        &self,
        request: CreateBlogPostRequest,
    ) -> Result<BlogPostResponse, ServiceError> {
        request.validate(&request).into_result()?;

        let post = self.posts.create(&request).await?;
        info!(post_id = post.id, title = %post.title, "Created blog post");

        Ok(BlogPostResponse::from(&post))
    }

    pub async fn list(&self) -> Result<Vec<BlogPostResponse>, ServiceError> {
        let posts = self.posts.list().await?;
        Ok(posts.iter().map(BlogPostResponse::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<BlogPostResponse, ServiceError> {
        let post = self
            .posts
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post".to_string()))?;

        Ok(BlogPostResponse::from(&post))
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(
        &self,
        id: i64,
        request: UpdateBlogPostRequest,
    ) -> Result<BlogPostResponse, ServiceError> {
        request.validate(&request).into_result()?;

        let mut post = self
            .posts
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post".to_string()))?;

        request.apply_to(&mut post);

        let updated = self
            .posts
            .update(&post)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post".to_string()))?;

        info!(post_id = id, "Updated blog post");
        Ok(BlogPostResponse::from(&updated))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.posts.soft_delete(id).await? {
            return Err(ServiceError::NotFound("Post".to_string()));
        }

        info!(post_id = id, "Deleted blog post");
        Ok(())
    }

    // ============================================================================
    // Publishing
    // ============================================================================

    pub async fn published(&self) -> Result<Vec<BlogPostResponse>, ServiceError> {
        let posts = self.posts.list_published().await?;
        Ok(posts.iter().map(BlogPostResponse::from).collect())
    }

    pub async fn publish(&self, id: i64) -> Result<BlogPostResponse, ServiceError> {
        self.set_published(id, true).await
    }

    pub async fn unpublish(&self, id: i64) -> Result<BlogPostResponse, ServiceError> {
        self.set_published(id, false).await
    }

    async fn set_published(
        &self,
        id: i64,
        published: bool,
    ) -> Result<BlogPostResponse, ServiceError> {
        let post = self
            .posts
            .set_published(id, published)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post".to_string()))?;

        info!(post_id = id, published = published, "Changed post visibility");
        Ok(BlogPostResponse::from(&post))
    }
}
