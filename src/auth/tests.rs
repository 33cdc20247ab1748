//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Session token issuance, validation and algorithm checks
//! - OAuth state signing
//! - The OAuth callback flow against store and provider doubles

#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::common::migrations::test_support::setup_test_db;
    use crate::common::{ExchangeError, ServiceError};
    use super::super::models::{Claims, GoogleUserInfo};
    use super::super::oauth::{generate_state, ProviderError};
    use super::super::token::TOKEN_ISSUER;

    const SECRET: &str = "test_secret_key";

    fn tokens() -> TokenService {
        TokenService::new(SECRET)
    }

    fn forge_token(alg: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
        let claims = Claims {
            sub: "1".to_string(),
            user_id: 1,
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    // ---- Token service ----

    #[test]
    fn test_issue_and_validate_round_trip() {
        let service = tokens();
        let token = service.issue(42, "alice@example.com", "Alice").unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.iss, "blog-auth-system");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_token_valid_until_just_before_expiry() {
        let service = tokens();
        let issued = Utc::now();
        let token = service.issue_at(7, "bob@example.com", "Bob", issued).unwrap();

        let almost = issued + Duration::days(7) - Duration::seconds(1);
        assert!(service.validate_at(&token, almost).is_ok());
    }

    #[test]
    fn test_token_expires_after_seven_days() {
        let service = tokens();
        let issued = Utc::now();
        let token = service.issue_at(7, "bob@example.com", "Bob", issued).unwrap();

        let later = issued + Duration::days(7) + Duration::seconds(1);
        assert!(matches!(
            service.validate_at(&token, later),
            Err(ServiceError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validation_fails_with_wrong_secret() {
        let token = tokens().issue(1, "alice@example.com", "Alice").unwrap();
        let other = TokenService::new("wrong_secret_key");

        assert!(matches!(
            other.validate(&token),
            Err(ServiceError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_alg_none_rejected_as_security_error() {
        let result = tokens().validate(&forge_token("none"));
        assert!(matches!(result, Err(ServiceError::Security(_))));
    }

    #[test]
    fn test_asymmetric_alg_rejected_as_security_error() {
        let result = tokens().validate(&forge_token("RS256"));
        assert!(matches!(result, Err(ServiceError::Security(_))));
    }

    #[test]
    fn test_other_hmac_algorithms_accepted() {
        let now = Utc::now();
        let claims = Claims {
            sub: "3".to_string(),
            user_id: 3,
            email: "carol@example.com".to_string(),
            name: "Carol".to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(tokens().validate(&token).unwrap(), claims);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "3".to_string(),
            user_id: 3,
            email: "carol@example.com".to_string(),
            name: "Carol".to_string(),
            iss: "someone-else".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            tokens().validate(&token),
            Err(ServiceError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        for raw in ["", "not-a-jwt", "%%%.abc.def"] {
            assert!(
                matches!(tokens().validate(raw), Err(ServiceError::InvalidToken(_))),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        let service = TokenService::new("");
        assert!(matches!(
            service.issue(1, "alice@example.com", "Alice"),
            Err(ServiceError::Configuration(_))
        ));
        assert!(matches!(
            service.validate("a.b.c"),
            Err(ServiceError::Configuration(_))
        ));
    }

    #[test]
    fn test_state_round_trip() {
        let service = tokens();
        let state = generate_state();
        let signed = service.issue_state(&state).unwrap();

        assert_eq!(service.verify_state(&signed).unwrap(), state);
    }

    #[test]
    fn test_state_expires_after_ten_minutes() {
        let service = tokens();
        let issued = Utc::now();
        let signed = service.issue_state_at("abc", issued).unwrap();

        assert!(service
            .verify_state_at(&signed, issued + Duration::minutes(11))
            .is_err());
    }

    #[test]
    fn test_session_token_is_not_a_state_token() {
        let service = tokens();
        let session = service.issue(1, "alice@example.com", "Alice").unwrap();
        let state = service.issue_state("abc").unwrap();

        assert!(service.verify_state(&session).is_err());
        assert!(service.validate(&state).is_err());
    }

    #[test]
    fn test_generated_state_shape() {
        let a = generate_state();
        let b = generate_state();

        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    // ---- OAuth flow ----

    #[derive(Clone, Copy)]
    enum ExchangeBehavior {
        Succeed,
        Reject,
        Unreachable,
    }

    struct StubProvider {
        exchange: ExchangeBehavior,
        profile: Mutex<Option<GoogleUserInfo>>,
        exchange_calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(exchange: ExchangeBehavior, profile: Option<GoogleUserInfo>) -> Self {
            Self {
                exchange,
                profile: Mutex::new(profile),
                exchange_calls: AtomicUsize::new(0),
            }
        }

        fn set_profile(&self, profile: GoogleUserInfo) {
            *self.profile.lock().unwrap() = Some(profile);
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://provider.test/auth?state={}", state)
        }

        async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            match self.exchange {
                ExchangeBehavior::Succeed => Ok(format!("access-{}", code)),
                ExchangeBehavior::Reject => Err(ProviderError::Rejected {
                    status: 400,
                    body: "invalid_grant".to_string(),
                }),
                ExchangeBehavior::Unreachable => {
                    Err(ProviderError::Transport("connection refused".to_string()))
                }
            }
        }

        async fn fetch_profile(&self, _token: &str) -> Result<GoogleUserInfo, ProviderError> {
            self.profile
                .lock()
                .unwrap()
                .clone()
                .ok_or(ProviderError::Rejected {
                    status: 500,
                    body: "backend error".to_string(),
                })
        }
    }

    /// In-memory user store that counts writes
    #[derive(Default)]
    struct RecordingUserStore {
        users: Mutex<Vec<User>>,
        writes: AtomicUsize,
    }

    impl RecordingUserStore {
        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for RecordingUserStore {
        async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.google_id == google_id)
                .cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }

        async fn create(&self, profile: &GoogleUserInfo) -> Result<User, sqlx::Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            let user = User {
                id: users.len() as i64 + 1,
                google_id: profile.id.clone(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                picture: profile.picture.clone(),
                created_at: "2025-06-20T09:00:00.000000Z".to_string(),
                updated_at: "2025-06-20T09:00:00.000000Z".to_string(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn update_profile(
            &self,
            id: i64,
            profile: &GoogleUserInfo,
        ) -> Result<User, sqlx::Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(sqlx::Error::RowNotFound)?;
            user.email = profile.email.clone();
            user.name = profile.name.clone();
            user.picture = profile.picture.clone();
            Ok(user.clone())
        }
    }

    fn alice() -> GoogleUserInfo {
        GoogleUserInfo {
            id: "google-alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            picture: "https://example.com/alice.png".to_string(),
        }
    }

    fn flow_with(
        exchange: ExchangeBehavior,
        profile: Option<GoogleUserInfo>,
    ) -> (OAuthFlow, Arc<StubProvider>, Arc<RecordingUserStore>) {
        let provider = Arc::new(StubProvider::new(exchange, profile));
        let users = Arc::new(RecordingUserStore::default());
        let flow = OAuthFlow::new(provider.clone(), users.clone(), tokens());
        (flow, provider, users)
    }

    #[test]
    fn test_start_embeds_state_in_url_and_cookie() {
        let (flow, _, _) = flow_with(ExchangeBehavior::Succeed, None);
        let start = flow.start().unwrap();

        assert!(start.authorization_url.ends_with(&start.state));
        assert_eq!(tokens().verify_state(&start.signed_state).unwrap(), start.state);
    }

    #[tokio::test]
    async fn test_callback_creates_user_and_issues_token() {
        let (flow, _, users) = flow_with(ExchangeBehavior::Succeed, Some(alice()));
        let start = flow.start().unwrap();

        let outcome = flow
            .complete_callback("code-1", &start.state, Some(&start.signed_state))
            .await
            .unwrap();

        assert_eq!(outcome.user.google_id, "google-alice");
        assert_eq!(users.len(), 1);
        assert_eq!(users.writes(), 1);

        let claims = tokens().validate(&outcome.token).unwrap();
        assert_eq!(claims.user_id, outcome.user.id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.name, "Alice");
    }

    #[tokio::test]
    async fn test_empty_code_creates_no_identity() {
        let (flow, provider, users) = flow_with(ExchangeBehavior::Succeed, Some(alice()));
        let start = flow.start().unwrap();

        let result = flow
            .complete_callback("", &start.state, Some(&start.signed_state))
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Exchange(ExchangeError::MissingCode))
        ));
        assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
        assert_eq!(users.len(), 0);
        assert_eq!(users.writes(), 0);
    }

    #[tokio::test]
    async fn test_second_login_with_unchanged_profile_does_not_write() {
        let (flow, _, users) = flow_with(ExchangeBehavior::Succeed, Some(alice()));

        for code in ["code-1", "code-2"] {
            let start = flow.start().unwrap();
            flow.complete_callback(code, &start.state, Some(&start.signed_state))
                .await
                .unwrap();
        }

        assert_eq!(users.len(), 1);
        assert_eq!(users.writes(), 1);
    }

    #[tokio::test]
    async fn test_changed_profile_is_reconciled() {
        let (flow, provider, users) = flow_with(ExchangeBehavior::Succeed, Some(alice()));

        let start = flow.start().unwrap();
        let first = flow
            .complete_callback("code-1", &start.state, Some(&start.signed_state))
            .await
            .unwrap();

        provider.set_profile(GoogleUserInfo {
            name: "Alice Liddell".to_string(),
            ..alice()
        });

        let start = flow.start().unwrap();
        let second = flow
            .complete_callback("code-2", &start.state, Some(&start.signed_state))
            .await
            .unwrap();

        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.name, "Alice Liddell");
        assert_eq!(users.len(), 1);
        assert_eq!(users.writes(), 2);
    }

    #[tokio::test]
    async fn test_state_mismatch_rejected_before_exchange() {
        let (flow, provider, users) = flow_with(ExchangeBehavior::Succeed, Some(alice()));
        let start = flow.start().unwrap();
        let other = generate_state();

        let result = flow
            .complete_callback("code-1", &other, Some(&start.signed_state))
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidState(_))));
        assert_eq!(provider.exchange_calls.load(Ordering::SeqCst), 0);
        assert_eq!(users.writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_or_forged_state_cookie_rejected() {
        let (flow, _, _) = flow_with(ExchangeBehavior::Succeed, Some(alice()));
        let start = flow.start().unwrap();
        let forged = TokenService::new("attacker").issue_state(&start.state).unwrap();

        for cookie in [None, Some(""), Some(forged.as_str())] {
            let result = flow.complete_callback("code-1", &start.state, cookie).await;
            assert!(matches!(result, Err(ServiceError::InvalidState(_))));
        }
    }

    #[tokio::test]
    async fn test_rejected_code_maps_to_exchange_rejected() {
        let (flow, _, users) = flow_with(ExchangeBehavior::Reject, Some(alice()));
        let start = flow.start().unwrap();

        let result = flow
            .complete_callback("used-code", &start.state, Some(&start.signed_state))
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Exchange(ExchangeError::Rejected(_)))
        ));
        assert_eq!(users.writes(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_provider_maps_to_unavailable() {
        let (flow, _, _) = flow_with(ExchangeBehavior::Unreachable, Some(alice()));
        let start = flow.start().unwrap();

        let result = flow
            .complete_callback("code-1", &start.state, Some(&start.signed_state))
            .await;

        assert!(matches!(
            result,
            Err(ServiceError::Exchange(ExchangeError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_profile_failure_is_profile_fetch_error() {
        let (flow, _, users) = flow_with(ExchangeBehavior::Succeed, None);
        let start = flow.start().unwrap();

        let result = flow
            .complete_callback("code-1", &start.state, Some(&start.signed_state))
            .await;

        assert!(matches!(result, Err(ServiceError::ProfileFetch(_))));
        assert_eq!(users.writes(), 0);
    }

    #[tokio::test]
    async fn test_profile_without_email_rejected() {
        let profile = GoogleUserInfo {
            email: String::new(),
            ..alice()
        };
        let (flow, _, users) = flow_with(ExchangeBehavior::Succeed, Some(profile));
        let start = flow.start().unwrap();

        let result = flow
            .complete_callback("code-1", &start.state, Some(&start.signed_state))
            .await;

        assert!(matches!(result, Err(ServiceError::ProfileFetch(_))));
        assert_eq!(users.len(), 0);
    }

    // ---- SQLite user store ----

    #[tokio::test]
    async fn test_sqlite_user_store_upsert() {
        let pool = setup_test_db().await;
        let store = SqliteUserStore::new(pool);

        assert!(store.find_by_google_id("google-alice").await.unwrap().is_none());

        let created = store.create(&alice()).await.unwrap();
        assert_eq!(created.google_id, "google-alice");
        assert_eq!(created.created_at, created.updated_at);

        let found = store.find_by_google_id("google-alice").await.unwrap().unwrap();
        assert_eq!(found, created);

        let renamed = GoogleUserInfo {
            name: "Alice Liddell".to_string(),
            ..alice()
        };
        let updated = store.update_profile(created.id, &renamed).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Alice Liddell");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_duplicate_google_id_rejected_by_store() {
        let pool = setup_test_db().await;
        let store = SqliteUserStore::new(pool);

        store.create(&alice()).await.unwrap();
        assert!(store.create(&alice()).await.is_err());
    }

    // ---- Bearer header parsing ----

    fn auth_headers(value: &str) -> axum::http::HeaderMap {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_token_requires_bearer_scheme() {
        use super::super::extractors::bearer_token;

        assert_eq!(bearer_token(&auth_headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&auth_headers("abc.def.ghi")), None);
        assert_eq!(bearer_token(&auth_headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&auth_headers("Bearer    ")), None);
        assert_eq!(bearer_token(&axum::http::HeaderMap::new()), None);
    }
}
