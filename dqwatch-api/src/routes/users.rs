/// User management endpoints (admin only)
///
/// # Endpoints
///
/// - `GET /api/users` - List identities (public fields only)
/// - `POST /api/users` - Create an identity
///
/// Identity creation is shared with public signup through [`register_user`].

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use dqwatch_shared::{
    auth::password,
    db::pool::DbPool,
    models::user::{CreateUser, PublicUser, Role, User},
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// New identity request, used by signup and admin create-user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Login name
    #[validate(
        length(min = 3, max = 50, message = "Username must be 3-50 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    /// Defaults to analyst
    #[serde(default)]
    pub role: Option<Role>,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("Username may only contain letters, digits, '.', '_' and '-'".into());
        Err(err)
    }
}

/// Validates and persists a new identity
///
/// # Errors
///
/// - `ValidationError` if a field is invalid
/// - `Conflict` if the username or email is already registered
pub async fn register_user(db: &DbPool, req: NewUserRequest) -> ApiResult<User> {
    req.validate()?;

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if User::exists(db, &username, &email).await? {
        return Err(ApiError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent insert still surfaces as Conflict via the unique index
    let user = User::create(
        db,
        CreateUser {
            username,
            email,
            password_hash,
            role: req.role.unwrap_or(Role::Analyst),
            name: req.name.trim().to_string(),
            avatar_url: None,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");

    Ok(user)
}

/// Lists every identity
///
/// ```text
/// GET /api/users
/// Authorization: Bearer <admin token>
/// ```
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Creates an identity
///
/// ```text
/// POST /api/users
/// Authorization: Bearer <admin token>
///
/// {
///   "name": "Jane Doe",
///   "username": "jane",
///   "email": "jane@example.com",
///   "password": "secret123",
///   "role": "analyst"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewUserRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = register_user(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}
