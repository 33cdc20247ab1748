//! # Posts Module
//!
//! This module handles blog posts:
//! - Post CRUD with soft delete
//! - Publishing and the published listing
//! - The public response shape (string id, formatted date)

pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod validators;


pub use repository::{PostStore, SqlitePostStore};
pub use routes::posts_routes;
pub use services::PostService;
