//! SQLite-backed user store

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::models::{GoogleUserInfo, User};
use super::oauth::UserStore;
use crate::common::helpers::now_timestamp;

const USER_COLUMNS: &str = "id, google_id, email, name, picture, created_at, updated_at";

pub struct SqliteUserStore {
    db: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE google_id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(google_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn create(&self, profile: &GoogleUserInfo) -> Result<User, sqlx::Error> {
        let now = now_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO users (google_id, email, name, picture, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.picture)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_profile(
        &self,
        id: i64,
        profile: &GoogleUserInfo,
    ) -> Result<User, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = ?, name = ?, picture = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.picture)
        .bind(now_timestamp())
        .bind(id)
        .execute(&self.db)
        .await?;

        self.find_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}
