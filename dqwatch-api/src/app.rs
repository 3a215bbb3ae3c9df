/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use dqwatch_api::{app::AppState, config::Config};
/// use dqwatch_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let state = AppState::new(pool, config);
/// let app = dqwatch_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{ApiConfig, Config},
    error::ApiError,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use dqwatch_shared::{
    auth::{
        authorization::require_role,
        federated::{FirebaseVerifier, IdentityVerifier},
        middleware::AuthContext,
        session::SessionManager,
    },
    db::pool::DbPool,
    models::{
        anomaly::Anomaly, data_issue::DataIssue, data_source::DataSource, insight::Insight,
        pipeline::DataPipeline, quality_metric::QualityMetric, report::Report, trend::TrendPoint,
        user::Role,
    },
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DbPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Access and refresh token management
    pub sessions: SessionManager,

    /// Federated (Google) ID token verifier
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Creates new application state with the Firebase verifier
    pub fn new(db: DbPool, config: Config) -> Self {
        let verifier = FirebaseVerifier::new(
            config.firebase.project_id.clone(),
            config.firebase.jwks_url.clone(),
        );

        Self::with_verifier(db, config, Arc::new(verifier))
    }

    /// Creates new application state with a custom identity verifier
    pub fn with_verifier(db: DbPool, config: Config, verifier: Arc<dyn IdentityVerifier>) -> Self {
        let sessions = SessionManager::new(
            config.jwt.secret.clone(),
            config.jwt.access_ttl(),
            config.jwt.refresh_ttl(),
        );

        Self {
            db,
            config: Arc::new(config),
            sessions,
            verifier,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET  /health                      # public
/// ├── /auth/
/// │   ├── POST /login, /signup, /google # public
/// │   ├── POST /refresh, /logout        # refresh cookie
/// │   └── GET  /me                      # bearer
/// ├── /users         GET, POST          # admin
/// ├── /settings      GET                # admin
/// ├── /dashboard/*   GET                # analyst+
/// └── /export/report GET (text/csv)     # analyst+
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS with credentials (tower-http CorsLayer)
/// 3. Bearer authentication, then the role gate (per route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_layer = middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    // Auth routes (public, no bearer token required)
    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/signup", post(routes::auth::signup))
        .route("/google", post(routes::auth::google_sign_in))
        .route("/refresh", post(routes::auth::refresh))
        .route("/logout", post(routes::auth::logout))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .layer(auth_layer.clone()),
        );

    // Admin-only routes
    let admin_routes = Router::new()
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route("/settings", get(routes::settings::list_settings))
        .layer(middleware::from_fn(admin_gate))
        .layer(auth_layer.clone());

    // Dashboard collections (any authenticated identity)
    let dashboard_routes = {
        use routes::dashboard::list_collection;

        Router::new()
            .route("/quality-metrics", get(list_collection::<QualityMetric>))
            .route("/pipeline-status", get(list_collection::<DataPipeline>))
            .route("/data-issues", get(list_collection::<DataIssue>))
            .route("/data-quality-by-source", get(list_collection::<DataSource>))
            .route("/recent-anomalies", get(list_collection::<Anomaly>))
            .route("/quality-trends", get(list_collection::<TrendPoint>))
            .route("/insights", get(list_collection::<Insight>))
            .route("/reports", get(list_collection::<Report>))
    };

    let analyst_routes = Router::new()
        .nest("/dashboard", dashboard_routes)
        .route("/export/report", get(routes::export::export_report))
        .layer(middleware::from_fn(analyst_gate))
        .layer(auth_layer);

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .merge(admin_routes)
        .merge(analyst_routes);

    let cors = cors_layer(&state.config.api);

    // Combine all routes with middleware stack
    Router::new()
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Builds the CORS layer
///
/// Credentials are always allowed so a browser client on another origin can
/// send the refresh cookie. With no configured origins the request origin is
/// mirrored back; otherwise only the listed origins are allowed.
pub fn cors_layer(api: &ApiConfig) -> CorsLayer {
    let allow_origin = if api.cors_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Bearer authentication middleware layer
///
/// Validates the access token from the Authorization header, then injects
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth_context = state.sessions.verify(auth_header).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), "Rejected request: {}", e);
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Checks the authenticated caller against a minimum role
async fn role_gate(required: Role, req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    if let Err(e) = require_role(auth, required) {
        tracing::warn!(user = %auth.username, path = %req.uri().path(), "{}", e);
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

async fn admin_gate(req: Request, next: Next) -> Result<Response, ApiError> {
    role_gate(Role::Admin, req, next).await
}

async fn analyst_gate(req: Request, next: Next) -> Result<Response, ApiError> {
    role_gate(Role::Analyst, req, next).await
}
