// src/common/config.rs
//! Process configuration, read once at startup

use std::env;
use thiserror::Error;

use crate::comments::tree::DEFAULT_MAX_REPLY_DEPTH;

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/google/callback";
const DEFAULT_DATABASE_URL: &str = "sqlite://blog_api.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Environment variable {name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Google OAuth client credentials
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub google: GoogleOAuthConfig,
    pub frontend_url: String,
    pub database_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Adds `Secure` to the OAuth state cookie
    pub cookie_secure: bool,
    pub max_reply_depth: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let jwt_secret = required("JWT_SECRET")?;
        let client_id = required("GOOGLE_CLIENT_ID")?;
        let client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let frontend_url = required("FRONTEND_URL")?;

        let redirect_uri =
            get("GOOGLE_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let max_reply_depth = match get("MAX_REPLY_DEPTH") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_REPLY_DEPTH",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_MAX_REPLY_DEPTH,
        };

        let cookie_secure = get("COOKIE_SECURE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        // Frontend origin is always allowed
        let mut cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let frontend_origin = frontend_url.trim_end_matches('/').to_string();
        if !cors_origins.contains(&frontend_origin) {
            cors_origins.push(frontend_origin);
        }

        Ok(Self {
            jwt_secret,
            google: GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri,
            },
            frontend_url,
            database_url,
            port,
            cors_origins,
            cookie_secure,
            max_reply_depth,
        })
    }
}
