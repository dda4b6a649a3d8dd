//! Storage-facing records that never leave the backend.

use shared::{Subscription, User};

/// A user row including the password hash
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// PHC formatted PBKDF2 hash; `None` for accounts without a password
    pub password_hash: Option<String>,
    pub created_at: String,
}

impl UserRecord {
    pub fn to_dto(&self) -> User {
        User {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// A login session. Only the SHA-256 of the bearer token is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

/// An active expense joined with its owner's contact details
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderCandidate {
    pub subscription: Subscription,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}
