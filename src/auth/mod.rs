//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OAuth login with CSRF state verification
//! - Session token issuance and validation
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod repository;
pub mod routes;
pub mod token;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use oauth::{IdentityProvider, OAuthFlow, UserStore};
pub use repository::SqliteUserStore;
pub use routes::auth_routes;
pub use token::TokenService;
