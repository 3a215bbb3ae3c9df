/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Login with username or email and password
/// - `POST /api/auth/signup` - Create an identity and sign in
/// - `POST /api/auth/google` - Sign in with a Google (Firebase) ID token
/// - `POST /api/auth/refresh` - Exchange the refresh cookie for a new access token
/// - `GET /api/auth/me` - Current identity
/// - `POST /api/auth/logout` - Revoke the refresh token and clear the cookie
///
/// Every sign-in path returns a short-lived bearer access token in the body
/// and sets the long-lived refresh token as an HttpOnly cookie scoped to
/// `/api/auth`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::users::{register_user, NewUserRequest},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dqwatch_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{FederatedProfile, PublicUser, Role, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Name of the refresh token cookie
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Path the refresh cookie is scoped to
const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[serde(alias = "email", alias = "identifier")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Google sign-in request
#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    /// Firebase ID token obtained by the client
    #[serde(alias = "idToken")]
    pub token: String,

    /// Role for the local identity; defaults to analyst
    #[serde(default)]
    pub role: Option<Role>,
}

/// Successful sign-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer access token
    pub token: String,

    pub user: PublicUser,
}

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New bearer access token
    pub token: String,
}

/// Logout response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Builds the refresh token cookie
fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(state.sessions.refresh_ttl().num_seconds());

    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(state.config.api.production)
        .same_site(SameSite::Strict)
        .path(REFRESH_COOKIE_PATH)
        .max_age(max_age)
        .build()
}

/// Issues an access token and a refresh cookie for a user
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let token = state.sessions.issue_access_token(&user)?;
    let refresh_token = state.sessions.issue_refresh_token(&state.db, user.id).await?;

    Ok((
        jar.add(refresh_cookie(state, refresh_token)),
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

/// Login endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// `username` also accepts an email address.
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "admin", "email": "...", "role": "admin", "name": "...", "avatarUrl": null }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = match User::find_by_identifier(&state.db, req.username.trim()).await? {
        Some(user) => user,
        None => {
            tracing::warn!(identifier = %req.username, "Login failed: unknown identity");
            return Err(invalid());
        }
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    start_session(&state, jar, user).await
}

/// Signup endpoint
///
/// ```text
/// POST /api/auth/signup
/// Content-Type: application/json
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
/// - `400 Bad Request`: Validation failed, or username/email already registered
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<NewUserRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let user = register_user(&state.db, req).await.map_err(|e| match e {
        ApiError::Conflict(msg) => ApiError::BadRequest(msg),
        other => other,
    })?;

    let (jar, body) = start_session(&state, jar, user).await?;
    Ok((StatusCode::CREATED, jar, body))
}

/// Google sign-in endpoint
///
/// Verifies the Firebase ID token, then creates or updates the local
/// identity with the provider-asserted email.
///
/// ```text
/// POST /api/auth/google
/// Content-Type: application/json
///
/// { "token": "eyJ...", "role": "analyst" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Provider token invalid or expired
/// - `503 Service Unavailable`: Google sign-in not configured or provider keys unreachable
pub async fn google_sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<GoogleSignInRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let identity = state.verifier.verify(&req.token).await?;

    let email = identity.email.trim().to_lowercase();
    let name = identity
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let user = User::upsert_federated(
        &state.db,
        FederatedProfile {
            email,
            name,
            avatar_url: identity.picture,
            role: req.role.unwrap_or(Role::Analyst),
            password_hash: password::hash_unusable_password()?,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, provider_uid = %identity.uid, "Federated sign-in");

    start_session(&state, jar, user).await
}

/// Refresh endpoint
///
/// Reads the `refreshToken` cookie, rotates it and returns a new access
/// token carrying the identity's current role.
///
/// # Errors
///
/// - `401 Unauthorized`: Cookie missing, unknown, revoked, overwritten or expired
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<RefreshResponse>)> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let renewed = state.sessions.refresh(&state.db, &presented).await?;

    Ok((
        jar.add(refresh_cookie(&state, renewed.refresh_token)),
        Json(RefreshResponse {
            token: renewed.access_token,
        }),
    ))
}

/// Current identity endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Token invalid, or the identity no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(PublicUser::from(user)))
}

/// Logout endpoint
///
/// Always succeeds. Revokes the presented refresh token, if any, and clears
/// the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<MessageResponse>)> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        if state.sessions.revoke(&state.db, cookie.value()).await? {
            tracing::info!("Refresh token revoked");
        }
    }

    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path(REFRESH_COOKIE_PATH));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}
