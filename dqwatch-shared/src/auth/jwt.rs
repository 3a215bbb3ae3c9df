/// Access token generation and validation
///
/// Access tokens are HS256-signed JWTs carrying the identity the gateway
/// needs on every request (user id, username, role), so verification never
/// touches the database. They are not persisted and cannot be revoked; they
/// simply expire.
///
/// # Validation
///
/// - Signature (HS256 with the configured secret)
/// - Issuer must be `"dqwatch"`
/// - `exp` and `nbf`, with zero leeway
///
/// # Example
///
/// ```
/// use dqwatch_shared::auth::jwt::{create_token, validate_token, Claims};
/// use dqwatch_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "jdoe", Role::Analyst, Duration::minutes(15));
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// assert_eq!(validated.role, Role::Analyst);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Issuer claim of every token this service signs
pub const ISSUER: &str = "dqwatch";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or claim validation failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is not a JWT at all
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),

    /// Token was signed for another issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// Access token claims
///
/// # Standard Claims
///
/// - `sub`: user ID
/// - `iss`: always "dqwatch"
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Custom Claims
///
/// - `username`: login name at issuance
/// - `role`: privilege tag at issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now
    ///
    /// A negative duration produces an already expired token, which is
    /// useful in tests.
    pub fn new(user_id: Uuid, username: &str, role: Role, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            username: username.to_string(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp().min(expiration.timestamp()),
            exp: expiration.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims into a compact JWT
///
/// The secret should be at least 32 bytes of random data.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and extracts its claims
///
/// # Errors
///
/// - `JwtError::Expired` once `exp` has passed
/// - `JwtError::InvalidIssuer` for tokens from another issuer
/// - `JwtError::InvalidFormat` for strings that are not JWTs
/// - `JwtError::ValidationError` for bad signatures and other failures
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    use jsonwebtoken::errors::ErrorKind;

    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            JwtError::InvalidFormat(e.to_string())
        }
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "jdoe", Role::Admin, Duration::minutes(15));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "jdoe");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());

        let left = claims.time_until_expiration().unwrap();
        assert!(left.num_seconds() > 15 * 60 - 5);
        assert!(left.num_seconds() <= 15 * 60);
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "jdoe", Role::Analyst, Duration::minutes(15));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.username, "jdoe");
        assert_eq!(validated.role, Role::Analyst);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Analyst, Duration::minutes(15));
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Admin, Duration::seconds(-3600));
        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_recently_expired_token_has_no_leeway() {
        let claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Admin, Duration::seconds(-2));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not-a-jwt", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
        assert!(validate_token("a.b.c", SECRET).is_err());
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Admin, Duration::minutes(5));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::InvalidIssuer)));
    }
}
