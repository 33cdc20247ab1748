// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::oauth::{IdentityProvider, OAuthFlow, UserStore};
use crate::auth::repository::SqliteUserStore;
use crate::auth::token::TokenService;
use crate::comments::{CommentService, SqliteCommentStore};
use crate::posts::{PostService, PostStore, SqlitePostStore};

/// Built once at startup and shared read-only between requests
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub users: Arc<dyn UserStore>,
    pub oauth: Arc<OAuthFlow>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
}

impl AppState {
    /// Wires the SQLite stores and services around `pool`
    pub fn new(
        db: SqlitePool,
        config: AppConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let tokens = TokenService::new(config.jwt_secret.clone());

        let users: Arc<dyn UserStore> = Arc::new(SqliteUserStore::new(db.clone()));
        let post_store: Arc<dyn PostStore> = Arc::new(SqlitePostStore::new(db.clone()));
        let comment_store = Arc::new(SqliteCommentStore::new(db.clone()));

        let oauth = Arc::new(OAuthFlow::new(provider, users.clone(), tokens.clone()));
        let posts = Arc::new(PostService::new(post_store.clone()));
        let comments = Arc::new(CommentService::new(
            comment_store,
            post_store,
            config.max_reply_depth,
        ));

        Self {
            db,
            config: Arc::new(config),
            tokens,
            users,
            oauth,
            posts,
            comments,
        }
    }
}
