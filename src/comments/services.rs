use std::sync::Arc;
use tracing::{debug, info};

use super::models::{
    Comment, CommentResponse, CreateCommentRequest, NewComment, UpdateCommentRequest,
};
use super::repository::CommentStore;
use super::tree::CommentArena;
use crate::common::{ServiceError, Validator};
use crate::posts::PostStore;

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
    max_depth: usize,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        posts: Arc<dyn PostStore>,
        max_depth: usize,
    ) -> Self {
        Self {
            comments,
            posts,
            max_depth,
        }
    }

    // ============================================================================
    // Creation
    // ============================================================================

    /// Top-level comment on a post
    pub async fn create_root(
        &self,
        blog_post_id: i64,
        request: CreateCommentRequest,
    ) -> Result<CommentResponse, ServiceError> {
        request.validate(&request).into_result()?;

        self.require_post(blog_post_id).await?;

        let comment = self
            .comments
            .create(&new_comment(blog_post_id, None, &request))
            .await?;

        info!(
            comment_id = comment.id,
            blog_post_id = blog_post_id,
            "Created comment"
        );
        Ok(CommentResponse::from(&comment))
    }

    /// Reply to `parent_id`; the reply always joins the parent's post
    pub async fn create_reply(
        &self,
        parent_id: i64,
        request: CreateCommentRequest,
    ) -> Result<CommentResponse, ServiceError> {
        request.validate(&request).into_result()?;

        let parent = self.require(parent_id, "Parent comment").await?;
        self.require_post(parent.blog_post_id).await?;

        let reply = self
            .comments
            .create(&new_comment(parent.blog_post_id, Some(parent.id), &request))
            .await?;

        info!(
            comment_id = reply.id,
            parent_id = parent.id,
            blog_post_id = reply.blog_post_id,
            "Created reply"
        );
        Ok(CommentResponse::from(&reply))
    }

    // ============================================================================
    // Reads
    // ============================================================================

    /// Root comments of a post, newest first, each with its replies
    pub async fn list_for_post(
        &self,
        blog_post_id: i64,
    ) -> Result<Vec<CommentResponse>, ServiceError> {
        // Missing and deleted posts both list as empty
        if self.posts.get(blog_post_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let arena = self.arena_for_post(blog_post_id).await?;
        Ok(arena.forest(self.max_depth))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CommentResponse, ServiceError> {
        let comment = self.require(id, "Comment").await?;
        self.tree_for(&comment).await
    }

    /// Direct replies of a comment, oldest first, each with its replies
    pub async fn list_replies(
        &self,
        parent_id: i64,
    ) -> Result<Vec<CommentResponse>, ServiceError> {
        let parent = self.require(parent_id, "Parent comment").await?;
        let arena = self.arena_for_post(parent.blog_post_id).await?;
        Ok(arena.replies_of(parent.id, self.max_depth))
    }

    // ============================================================================
    // Updates
    // ============================================================================

    /// Text-only patch; a request without text leaves the comment unchanged
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCommentRequest,
    ) -> Result<CommentResponse, ServiceError> {
        request.validate(&request).into_result()?;

        let comment = match request.text {
            Some(text) => self
                .comments
                .update_text(id, &text)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Comment".to_string()))?,
            None => self.require(id, "Comment").await?,
        };

        info!(comment_id = id, "Updated comment");
        self.tree_for(&comment).await
    }

    /// Soft delete; replies are left in place
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.comments.soft_delete(id).await? {
            return Err(ServiceError::NotFound("Comment".to_string()));
        }

        info!(comment_id = id, "Deleted comment");
        Ok(())
    }

    async fn require(&self, id: i64, entity: &str) -> Result<Comment, ServiceError> {
        self.comments
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(entity.to_string()))
    }

    async fn require_post(&self, blog_post_id: i64) -> Result<(), ServiceError> {
        match self.posts.get(blog_post_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("Post".to_string())),
        }
    }

    async fn arena_for_post(&self, blog_post_id: i64) -> Result<CommentArena, ServiceError> {
        let comments = self.comments.list_for_post(blog_post_id).await?;
        debug!(
            blog_post_id = blog_post_id,
            count = comments.len(),
            "Loaded comments for tree"
        );
        Ok(CommentArena::new(comments))
    }

    async fn tree_for(&self, comment: &Comment) -> Result<CommentResponse, ServiceError> {
        let arena = self.arena_for_post(comment.blog_post_id).await?;
        Ok(arena
            .subtree(comment.id, self.max_depth)
            .unwrap_or_else(|| CommentResponse::from(comment)))
    }
}

fn new_comment(
    blog_post_id: i64,
    parent_id: Option<i64>,
    request: &CreateCommentRequest,
) -> NewComment {
    NewComment {
        blog_post_id,
        parent_id,
        name: request.name.trim().to_string(),
        email: request.normalized_email(),
        text: request.text.clone(),
    }
}
