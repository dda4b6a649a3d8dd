use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{SessionRecord, UserRecord};
use crate::storage::connection::DbConnection;
use crate::storage::traits::UserStorage;

/// Repository for users and their login sessions
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_user(row: &SqliteRow) -> Result<UserRecord> {
        Ok(UserRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    async fn store_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;
        row.as_ref().map(Self::map_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE lower(email) = lower(?)",
        )
        .bind(email.trim())
        .fetch_optional(self.db.pool())
        .await?;
        row.as_ref().map(Self::map_user).transpose()
    }

    async fn delete_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn store_session(&self, session: &SessionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.token_hash)
        .bind(&session.user_id)
        .bind(&session.created_at)
        .bind(&session.expires_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_session(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        let row = sqlx::query(
            "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(SessionRecord {
                token_hash: row.try_get("token_hash")?,
                user_id: row.try_get("user_id")?,
                created_at: row.try_get("created_at")?,
                expires_at: row.try_get("expires_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token_hash: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
