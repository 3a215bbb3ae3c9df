/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access token signing and validation
/// - [`session`]: access token issuance plus refresh token rotation/revocation
/// - [`federated`]: provider (Firebase) ID token verification
/// - [`middleware`]: bearer header parsing and the request [`AuthContext`](middleware::AuthContext)
/// - [`authorization`]: role gate
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::auth::password::{hash_password, verify_password};
/// use dqwatch_shared::auth::jwt::{create_token, validate_token, Claims};
/// use dqwatch_shared::models::user::Role;
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "jdoe", Role::Analyst, Duration::minutes(15));
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod federated;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
