//! Comment persistence

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{Comment, NewComment};
use crate::common::helpers::now_timestamp;

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, comment: &NewComment) -> Result<Comment, sqlx::Error>;

    /// Soft-deleted comments resolve to `None`
    async fn get(&self, id: i64) -> Result<Option<Comment>, sqlx::Error>;

    /// Every live comment of the post, roots and replies alike
    async fn list_for_post(&self, blog_post_id: i64) -> Result<Vec<Comment>, sqlx::Error>;

    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>, sqlx::Error>;

    /// Returns false when no live comment had this id
    async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

const COMMENT_COLUMNS: &str =
    "id, blog_post_id, parent_id, name, email, text, created_at, updated_at";

pub struct SqliteCommentStore {
    db: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn create(&self, comment: &NewComment) -> Result<Comment, sqlx::Error> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (blog_post_id, parent_id, name, email, text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.blog_post_id)
        .bind(comment.parent_id)
        .bind(&comment.name)
        .bind(comment.email.as_deref())
        .bind(&comment.text)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn get(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = ? AND deleted_at IS NULL",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn list_for_post(&self, blog_post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE blog_post_id = ? AND deleted_at IS NULL
            ORDER BY created_at ASC, id ASC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(blog_post_id)
        .fetch_all(&self.db)
        .await
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Option<Comment>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET text = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(text)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
