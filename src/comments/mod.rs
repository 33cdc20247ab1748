//! # Comments Module
//!
//! Threaded comments on blog posts:
//! - Root comments and replies of unbounded depth
//! - Tree assembly and response shaping with a depth ceiling
//! - Text edits and soft delete

pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod tree;
pub mod validators;

#[cfg(test)]
mod tests;

pub use repository::{CommentStore, SqliteCommentStore};
pub use routes::comments_routes;
pub use services::CommentService;
