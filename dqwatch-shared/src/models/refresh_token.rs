/// Refresh token records
///
/// Only the SHA-256 digest of a refresh token is stored. The table is keyed
/// by user id, so storing a new token for a user overwrites the previous one
/// (one active session per user).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE refresh_tokens (
///     user_id BLOB PRIMARY KEY NOT NULL REFERENCES users(id),
///     token_hash TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL,
///     expires_at TEXT NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::pool::DbPool;

/// Stored refresh token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    /// Owner of the token
    pub user_id: Uuid,

    /// Hex-encoded SHA-256 digest of the plaintext token
    pub token_hash: String,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Stores a token digest for a user, replacing any previous one
    pub async fn upsert(
        pool: &DbPool,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id) DO UPDATE SET
                token_hash = excluded.token_hash,
                created_at = excluded.created_at,
                expires_at = excluded.expires_at
            RETURNING user_id, token_hash, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(Utc::now())
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Finds the record for a token digest
    pub async fn find_by_hash(
        pool: &DbPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT user_id, token_hash, created_at, expires_at FROM refresh_tokens WHERE token_hash = ?1",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the record for a token digest
    ///
    /// Returns true if a record was removed.
    pub async fn delete_by_hash(pool: &DbPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?1")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
