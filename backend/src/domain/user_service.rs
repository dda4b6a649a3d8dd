//! Accounts and bearer sessions.
//!
//! Passwords are stored as PBKDF2-SHA256 PHC strings. A login issues a random
//! token; only its SHA-256 digest is persisted, so a leaked database cannot be
//! replayed as sessions.

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;
use sha2::{Digest, Sha256};
use shared::{LoginRequest, RegisterUserRequest, SessionResponse, User};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::domain::models::{SessionRecord, UserRecord};
use crate::storage::UserStorage;

const MIN_PASSWORD_LEN: usize = 6;
const SESSION_DAYS: i64 = 30;
const TOKEN_BYTES: usize = 32;

#[cfg(not(test))]
const PASSWORD_ROUNDS: u32 = 100_000;
#[cfg(test)]
const PASSWORD_ROUNDS: u32 = 1_000;

#[derive(Clone)]
pub struct UserService {
    storage: Arc<dyn UserStorage>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(storage: Arc<dyn UserStorage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub async fn register(&self, request: RegisterUserRequest) -> DomainResult<User> {
        let name = request.name.trim().to_string();
        let email = request.email.trim().to_ascii_lowercase();

        let mut v = Validator::new();
        v.check(!name.is_empty(), "name", "Name is required");
        v.check(looks_like_email(&email), "email", "Invalid email address");
        v.check(
            request.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Password must be at least 6 characters",
        );
        v.finish()?;

        if self.storage.get_user_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already in use".to_string()));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: Some(name),
            email: Some(email),
            password_hash: Some(hash_password(&request.password)?),
            created_at: self.clock.now().to_rfc3339(),
        };
        self.storage.store_user(&record).await?;

        info!("Registered user {}", record.id);
        Ok(record.to_dto())
    }

    /// Check credentials and open a new session
    pub async fn login(&self, request: LoginRequest) -> DomainResult<SessionResponse> {
        let Some(user) = self.storage.get_user_by_email(request.email.trim()).await? else {
            debug!("Login for unknown email");
            return Err(DomainError::Unauthorized);
        };

        let verified = user
            .password_hash
            .as_deref()
            .map(|hash| verify_password(&request.password, hash))
            .unwrap_or(false);
        if !verified {
            warn!("Failed login for user {}", user.id);
            return Err(DomainError::Unauthorized);
        }

        let token = generate_token();
        let now = self.clock.now();
        let expires_at = now + Duration::days(SESSION_DAYS);
        self.storage
            .store_session(&SessionRecord {
                token_hash: hash_token(&token),
                user_id: user.id.clone(),
                created_at: now.to_rfc3339(),
                expires_at: expires_at.to_rfc3339(),
            })
            .await?;

        info!("User {} logged in", user.id);
        Ok(SessionResponse {
            token,
            user_id: user.id,
            expires_at: expires_at.to_rfc3339(),
        })
    }

    /// Resolve a bearer token to the user id of a live session
    pub async fn authenticate(&self, token: &str) -> DomainResult<Option<String>> {
        let token_hash = hash_token(token);
        let Some(session) = self.storage.get_session(&token_hash).await? else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
            .map_err(|e| anyhow!("Invalid stored session expiry {}: {}", session.expires_at, e))?;
        if expires_at.with_timezone(&Utc) <= self.clock.now() {
            debug!("Session for user {} expired", session.user_id);
            self.storage.delete_session(&token_hash).await?;
            return Ok(None);
        }

        Ok(Some(session.user_id))
    }

    pub async fn logout(&self, token: &str) -> DomainResult<()> {
        self.storage.delete_session(&hash_token(token)).await?;
        Ok(())
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn hash_password(password: &str) -> DomainResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!("Failed to encode salt: {}", e))?;

    let params = Params {
        rounds: PASSWORD_ROUNDS,
        ..Params::default()
    };
    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!("Unreadable password hash: {}", e);
            false
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::{DbConnection, UserRepository};
    use chrono::TimeZone;

    fn register_request(email: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn setup_at(now: DateTime<Utc>) -> (UserService, Arc<UserRepository>) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let storage = Arc::new(UserRepository::new(db));
        (UserService::new(storage.clone(), Arc::new(FixedClock(now))), storage)
    }

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let (service, storage) = setup_at(jan_first()).await;
        let user = service.register(register_request(" Alice@Example.com ")).await.expect("register failed");

        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        let record = storage.get_user(&user.id).await.unwrap().unwrap();
        let hash = record.password_hash.unwrap();
        assert!(hash.starts_with("$pbkdf2-sha256$"));
        assert!(!hash.contains("hunter22"));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let (service, _) = setup_at(jan_first()).await;
        service.register(register_request("alice@example.com")).await.unwrap();

        let second = service.register(register_request("ALICE@example.com")).await;
        assert!(matches!(second, Err(DomainError::Conflict(msg)) if msg == "Email already in use"));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (service, _) = setup_at(jan_first()).await;
        let request = RegisterUserRequest {
            name: " ".to_string(),
            email: "not-an-email".to_string(),
            password: "12345".to_string(),
        };

        match service.register(request).await {
            Err(DomainError::Validation(errors)) => {
                assert!(errors.contains_key("name"));
                assert!(errors.contains_key("email"));
                assert_eq!(errors["password"], vec!["Password must be at least 6 characters"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (service, _) = setup_at(jan_first()).await;
        let user = service.register(register_request("alice@example.com")).await.unwrap();

        let session = service
            .login(login_request("alice@example.com", "hunter22"))
            .await
            .expect("login failed");
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.token.len(), TOKEN_BYTES * 2);
        assert_eq!(session.expires_at, (jan_first() + Duration::days(30)).to_rfc3339());

        assert_eq!(service.authenticate(&session.token).await.unwrap(), Some(user.id));
        assert_eq!(service.authenticate("bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_or_unknown_email() {
        let (service, _) = setup_at(jan_first()).await;
        service.register(register_request("alice@example.com")).await.unwrap();

        assert!(matches!(
            service.login(login_request("alice@example.com", "wrong-password")).await,
            Err(DomainError::Unauthorized)
        ));
        assert!(matches!(
            service.login(login_request("nobody@example.com", "hunter22")).await,
            Err(DomainError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let (service, _) = setup_at(jan_first()).await;
        service.register(register_request("alice@example.com")).await.unwrap();
        let session = service.login(login_request("alice@example.com", "hunter22")).await.unwrap();

        service.logout(&session.token).await.unwrap();
        assert_eq!(service.authenticate(&session.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (service, storage) = setup_at(jan_first()).await;
        service.register(register_request("alice@example.com")).await.unwrap();
        let session = service.login(login_request("alice@example.com", "hunter22")).await.unwrap();

        let later = UserService::new(storage.clone(), Arc::new(FixedClock(jan_first() + Duration::days(31))));
        assert_eq!(later.authenticate(&session.token).await.unwrap(), None);
        assert!(storage.get_session(&hash_token(&session.token)).await.unwrap().is_none());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.co"));
    }
}
