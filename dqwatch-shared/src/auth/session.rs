/// Session management
///
/// [`SessionManager`] owns both halves of a session:
///
/// - **Access tokens**: short-lived signed JWTs, verified statelessly on
///   every request.
/// - **Refresh tokens**: 32 random bytes, hex-encoded, handed to the client
///   once. Only the SHA-256 digest is stored, one row per user, so issuing a
///   new refresh token invalidates the previous one.
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::auth::session::SessionManager;
/// use dqwatch_shared::models::user::User;
/// use chrono::Duration;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user: User) -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionManager::new("secret-key-at-least-32-bytes-long!!", Duration::minutes(15), Duration::days(7));
///
/// let access = sessions.issue_access_token(&user)?;
/// let refresh = sessions.issue_refresh_token(&pool, user.id).await?;
///
/// // Later: trade the refresh token for a fresh pair
/// let renewed = sessions.refresh(&pool, &refresh).await?;
/// assert_ne!(renewed.refresh_token, refresh);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::jwt::{create_token, Claims, JwtError};
use super::middleware::{authenticate, AuthContext, AuthError};
use crate::db::pool::DbPool;
use crate::models::refresh_token::RefreshToken;
use crate::models::user::User;

/// Number of random bytes in a refresh token
const REFRESH_TOKEN_BYTES: usize = 32;

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Refresh token is unknown, revoked or overwritten
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token is past its expiry
    #[error("Refresh token has expired")]
    Expired,

    /// Access token signing failed
    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a successful refresh
#[derive(Debug, Clone)]
pub struct RenewedSession {
    /// Identity as currently stored
    pub user: User,
    pub access_token: String,

    /// Replacement refresh token; the presented one is no longer valid
    pub refresh_token: String,
}

/// Issues, verifies, rotates and revokes session tokens
#[derive(Clone)]
pub struct SessionManager {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Lifetime of refresh tokens (also the cookie max-age)
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Signs an access token for the user's current username and role
    pub fn issue_access_token(&self, user: &User) -> Result<String, SessionError> {
        let claims = Claims::new(user.id, &user.username, user.role, self.access_ttl);
        Ok(create_token(&claims, &self.secret)?)
    }

    /// Resolves the identity behind an `Authorization` header value
    pub fn verify(&self, header_value: Option<&str>) -> Result<AuthContext, AuthError> {
        authenticate(header_value, &self.secret)
    }

    /// Creates a refresh token for a user, replacing any previous one
    ///
    /// Returns the plaintext token; it is not recoverable afterwards.
    pub async fn issue_refresh_token(
        &self,
        pool: &DbPool,
        user_id: Uuid,
    ) -> Result<String, SessionError> {
        let token = generate_refresh_token();
        let expires_at = Utc::now() + self.refresh_ttl;

        RefreshToken::upsert(pool, user_id, &hash_refresh_token(&token), expires_at).await?;

        Ok(token)
    }

    /// Exchanges a refresh token for a new access token and a rotated
    /// refresh token
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidRefreshToken` if the token is unknown or its
    ///   user no longer exists
    /// - `SessionError::Expired` if the token has expired (the record is
    ///   removed)
    pub async fn refresh(&self, pool: &DbPool, token: &str) -> Result<RenewedSession, SessionError> {
        let token_hash = hash_refresh_token(token);

        let record = RefreshToken::find_by_hash(pool, &token_hash)
            .await?
            .ok_or(SessionError::InvalidRefreshToken)?;

        if record.is_expired() {
            RefreshToken::delete_by_hash(pool, &token_hash).await?;
            return Err(SessionError::Expired);
        }

        let user = User::find_by_id(pool, record.user_id)
            .await?
            .ok_or(SessionError::InvalidRefreshToken)?;

        let access_token = self.issue_access_token(&user)?;
        let refresh_token = self.issue_refresh_token(pool, user.id).await?;

        Ok(RenewedSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Revokes a refresh token
    ///
    /// Returns true if a stored token was removed.
    pub async fn revoke(&self, pool: &DbPool, token: &str) -> Result<bool, SessionError> {
        Ok(RefreshToken::delete_by_hash(pool, &hash_refresh_token(token)).await?)
    }
}

/// Generates 32 random bytes, hex-encoded
fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex-encoded SHA-256 digest of a refresh token
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    };
    use crate::models::user::{CreateUser, Role};

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn manager() -> SessionManager {
        SessionManager::new(SECRET, Duration::minutes(15), Duration::days(7))
    }

    async fn pool_with_user(role: Role) -> (DbPool, User) {
        let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user = User::create(
            &pool,
            CreateUser {
                username: "jdoe".to_string(),
                email: "jdoe@example.com".to_string(),
                password_hash: "hash".to_string(),
                role,
                name: "John".to_string(),
                avatar_url: None,
            },
        )
        .await
        .unwrap();

        (pool, user)
    }

    #[test]
    fn test_refresh_token_shape() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_refresh_token());
    }

    #[test]
    fn test_hash_refresh_token_is_deterministic() {
        let hash = hash_refresh_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_refresh_token("abc"));
        assert_ne!(hash, hash_refresh_token("abd"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", manager());
        assert!(!debug.contains(SECRET));
    }

    #[tokio::test]
    async fn test_access_token_carries_role() {
        let (_pool, user) = pool_with_user(Role::Admin).await;
        let sessions = manager();

        let token = sessions.issue_access_token(&user).unwrap();
        let auth = sessions.verify(Some(&format!("Bearer {}", token))).unwrap();

        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_stored_digest_not_plaintext() {
        let (pool, user) = pool_with_user(Role::Analyst).await;
        let token = manager().issue_refresh_token(&pool, user.id).await.unwrap();

        assert!(RefreshToken::find_by_hash(&pool, &token).await.unwrap().is_none());
        assert!(RefreshToken::find_by_hash(&pool, &hash_refresh_token(&token))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_refresh_rotates_token() {
        let (pool, user) = pool_with_user(Role::Analyst).await;
        let sessions = manager();

        let first = sessions.issue_refresh_token(&pool, user.id).await.unwrap();
        let renewed = sessions.refresh(&pool, &first).await.unwrap();

        assert_eq!(renewed.user.id, user.id);
        assert_ne!(renewed.refresh_token, first);

        assert!(matches!(
            sessions.refresh(&pool, &first).await,
            Err(SessionError::InvalidRefreshToken)
        ));
        assert!(sessions.refresh(&pool, &renewed.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_new_login_overwrites_previous_token() {
        let (pool, user) = pool_with_user(Role::Analyst).await;
        let sessions = manager();

        let first = sessions.issue_refresh_token(&pool, user.id).await.unwrap();
        let second = sessions.issue_refresh_token(&pool, user.id).await.unwrap();

        assert!(matches!(
            sessions.refresh(&pool, &first).await,
            Err(SessionError::InvalidRefreshToken)
        ));
        assert!(sessions.refresh(&pool, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke() {
        let (pool, user) = pool_with_user(Role::Analyst).await;
        let sessions = manager();

        let token = sessions.issue_refresh_token(&pool, user.id).await.unwrap();
        assert!(sessions.revoke(&pool, &token).await.unwrap());
        assert!(!sessions.revoke(&pool, &token).await.unwrap());

        assert!(matches!(
            sessions.refresh(&pool, &token).await,
            Err(SessionError::InvalidRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let (pool, user) = pool_with_user(Role::Analyst).await;
        let sessions = SessionManager::new(SECRET, Duration::minutes(15), Duration::seconds(-1));

        let token = sessions.issue_refresh_token(&pool, user.id).await.unwrap();
        assert!(matches!(
            sessions.refresh(&pool, &token).await,
            Err(SessionError::Expired)
        ));
        assert!(matches!(
            sessions.refresh(&pool, &token).await,
            Err(SessionError::InvalidRefreshToken)
        ));
    }
}
