/// Role-based authorization
///
/// Roles form a closed, totally ordered set (`analyst < admin`). A caller is
/// permitted when their role is at least the required one.
///
/// # Example
///
/// ```
/// use dqwatch_shared::auth::authorization::require_role;
/// use dqwatch_shared::auth::middleware::AuthContext;
/// use dqwatch_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let auth = AuthContext {
///     user_id: Uuid::new_v4(),
///     username: "analyst".to_string(),
///     role: Role::Analyst,
/// };
///
/// assert!(require_role(&auth, Role::Analyst).is_ok());
/// assert!(require_role(&auth, Role::Admin).is_err());
/// ```

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is below the required one
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: Role, actual: Role },
}

/// Checks that the caller holds at least `required`
pub fn require_role(auth: &AuthContext, required: Role) -> Result<(), AuthzError> {
    if !auth.role.satisfies(required) {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(())
}
