//! Blog post persistence

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{BlogPost, CreateBlogPostRequest};
use crate::common::helpers::now_timestamp;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, request: &CreateBlogPostRequest) -> Result<BlogPost, sqlx::Error>;

    /// Newest first
    async fn list(&self) -> Result<Vec<BlogPost>, sqlx::Error>;

    async fn list_published(&self) -> Result<Vec<BlogPost>, sqlx::Error>;

    /// Soft-deleted posts resolve to `None`
    async fn get(&self, id: i64) -> Result<Option<BlogPost>, sqlx::Error>;

    /// Persists title, excerpt, author and image of `post`
    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>, sqlx::Error>;

    async fn set_published(&self, id: i64, published: bool)
        -> Result<Option<BlogPost>, sqlx::Error>;

    /// Returns false when no live post had this id
    async fn soft_delete(&self, id: i64) -> Result<bool, sqlx::Error>;
}

const POST_COLUMNS: &str =
    "id, title, excerpt, author, image, published, created_at, updated_at";

pub struct SqlitePostStore {
    db: SqlitePool,
}

impl SqlitePostStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn create(&self, request: &CreateBlogPostRequest) -> Result<BlogPost, sqlx::Error> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO blog_posts (title, excerpt, author, image, published, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&request.title)
        .bind(&request.excerpt)
        .bind(&request.author)
        .bind(&request.image)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn list(&self) -> Result<Vec<BlogPost>, sqlx::Error> {
        sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            SELECT {}
            FROM blog_posts
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
            POST_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
    }

    async fn list_published(&self) -> Result<Vec<BlogPost>, sqlx::Error> {
        sqlx::query_as::<_, BlogPost>(&format!(
            r#"
            SELECT {}
            FROM blog_posts
            WHERE deleted_at IS NULL AND published = 1
            ORDER BY created_at DESC, id DESC
            "#,
            POST_COLUMNS
        ))
        .fetch_all(&self.db)
        .await
    }

    async fn get(&self, id: i64) -> Result<Option<BlogPost>, sqlx::Error> {
        sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {} FROM blog_posts WHERE id = ? AND deleted_at IS NULL",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn update(&self, post: &BlogPost) -> Result<Option<BlogPost>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, excerpt = ?, author = ?, image = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.author)
        .bind(&post.image)
        .bind(now_timestamp())
        .bind(post.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(post.id).await
    }

    async fn set_published(
        &self,
        id: i64,
        published: bool,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE blog_posts SET published = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(published)
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
            "UPDATE blog_posts SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
