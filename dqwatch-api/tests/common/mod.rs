/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory database with migrations and seed data
/// - Stub identity verifier for Google sign-in
/// - Request helpers driving the router directly

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use dqwatch_api::app::{build_router, AppState};
use dqwatch_api::config::Config;
use dqwatch_shared::auth::federated::{FederatedError, FederatedIdentity, IdentityVerifier};
use dqwatch_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig, DbPool},
    seed::seed_if_empty,
};
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Provider token the stub verifier accepts
pub const VALID_GOOGLE_TOKEN: &str = "valid-google-token";

/// Accepts exactly [`VALID_GOOGLE_TOKEN`]
pub struct StubVerifier;

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedIdentity, FederatedError> {
        if id_token == VALID_GOOGLE_TOKEN {
            Ok(FederatedIdentity {
                uid: "google-uid-1".to_string(),
                email: "grace@example.com".to_string(),
                name: Some("Grace Hopper".to_string()),
                picture: Some("https://example.com/grace.png".to_string()),
            })
        } else {
            Err(FederatedError::InvalidToken("signature mismatch".to_string()))
        }
    }
}

/// Test response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|_| {
            panic!(
                "Expected JSON body, got {}: {}",
                self.status,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Value of the `refreshToken` cookie set by this response, if any
    pub fn refresh_cookie(&self) -> Option<String> {
        self.set_cookie_header().and_then(|h| {
            h.split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("refreshToken="))
                .map(str::to_string)
        })
    }

    /// Raw `Set-Cookie` header for the refresh cookie
    pub fn set_cookie_header(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("refreshToken="))
            .map(str::to_string)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: DbPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh seeded in-memory database
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_vars(&[]).await
    }

    /// Creates a test context with extra configuration variables
    pub async fn with_vars(vars: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut all: Vec<(String, String)> = vec![("JWT_SECRET".into(), JWT_SECRET.into())];
        all.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = Config::from_vars(|key| {
            all.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })?;

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;
        seed_if_empty(&db).await?;

        let state = AppState::with_verifier(db.clone(), config.clone(), Arc::new(StubVerifier));
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET with an optional bearer token
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a JSON body with an optional bearer token
    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// POST with a refresh cookie and no body
    pub async fn post_with_cookie(&self, uri: &str, refresh_token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = refresh_token {
            builder = builder.header(header::COOKIE, format!("refreshToken={}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Logs in and returns the response
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.post_json(
            "/api/auth/login",
            None,
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Logs in and returns the access token, panicking on failure
    pub async fn token_for(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.text());
        response.json()["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for("admin", "admin123").await
    }

    pub async fn analyst_token(&self) -> String {
        self.token_for("analyst", "analyst123").await
    }
}
