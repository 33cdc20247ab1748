//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session token claims
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by the OAuth state cookie
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StateClaims {
    pub state: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// True when any reconciled profile field differs from `profile`
    pub fn differs_from(&self, profile: &GoogleUserInfo) -> bool {
        self.email != profile.email || self.name != profile.name || self.picture != profile.picture
    }
}

/// Profile returned by Google's userinfo endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GoogleUserInfo {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Public user shape returned after login
#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub picture: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.picture.clone(),
        }
    }
}

/// Query parameters Google appends to the callback URL
#[derive(Deserialize, Debug, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
