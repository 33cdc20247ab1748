// src/services/google.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::auth::models::GoogleUserInfo;
use crate::auth::oauth::{IdentityProvider, ProviderError};
use crate::common::config::GoogleOAuthConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Google endpoint URLs; tests point these at a local mock server.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub authorization: String,
    pub token: String,
    pub userinfo: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            authorization: AUTHORIZATION_ENDPOINT.to_string(),
            token: TOKEN_ENDPOINT.to_string(),
            userinfo: USERINFO_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleProvider {
    config: GoogleOAuthConfig,
    endpoints: GoogleEndpoints,
    client: Client,
}

impl GoogleProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self::with_endpoints(config, GoogleEndpoints::default())
    }

    pub fn with_endpoints(config: GoogleOAuthConfig, endpoints: GoogleEndpoints) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            endpoints,
            client,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> String {
        let scope_param = SCOPES.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.endpoints.authorization,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scope_param),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.endpoints.token)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange failed");

            // 4xx means Google looked at the code and refused it
            return Err(if status.is_client_error() {
                ProviderError::Rejected {
                    status: status.as_u16(),
                    body: error_text,
                }
            } else {
                ProviderError::Transport(format!("HTTP {}: {}", status, error_text))
            });
        }

        let token_response = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(token_response.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<GoogleUserInfo, ProviderError> {
        let response = self
            .client
            .get(&self.endpoints.userinfo)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Failed to get user info");
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}
