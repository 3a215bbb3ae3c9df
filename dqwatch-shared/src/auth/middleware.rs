/// Request authentication primitives
///
/// The HTTP layer calls [`authenticate`] with the raw `Authorization` header
/// value. On success it attaches the returned [`AuthContext`] to the request
/// extensions so handlers and the role gate can read it without touching the
/// database.
///
/// # Example
///
/// ```
/// use dqwatch_shared::auth::jwt::{create_token, Claims};
/// use dqwatch_shared::auth::middleware::authenticate;
/// use dqwatch_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "secret-key-at-least-32-bytes-long!!";
/// let claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Analyst, Duration::minutes(15));
/// let header = format!("Bearer {}", create_token(&claims, secret)?);
///
/// let auth = authenticate(Some(&header), secret)?;
/// assert_eq!(auth.username, "jdoe");
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::Role;

/// Authenticated identity attached to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Username at token issuance
    pub username: String,

    /// Role at token issuance
    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Error type for request authentication
///
/// Every variant is an authentication failure (401 at the HTTP layer).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

/// Extracts the token from a `Bearer <token>` header value
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves the identity behind an `Authorization` header value
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent
/// - `AuthError::InvalidFormat` if it is not a bearer token
/// - `AuthError::InvalidToken` if the token is expired, forged or malformed
pub fn authenticate(header_value: Option<&str>, secret: &str) -> Result<AuthContext, AuthError> {
    let header_value = header_value.ok_or(AuthError::MissingCredentials)?;
    let token = extract_bearer_token(header_value)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    Ok(AuthContext::from(claims))
}
