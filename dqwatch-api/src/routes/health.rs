/// Liveness and datastore readiness
///
/// ```text
/// GET /api/health
/// ```
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected", "seeded": true }
/// ```
///
/// `seeded` is true once at least one identity exists, so a fresh deployment
/// with `SEED_DATA=false` reports that nobody can sign in yet.

use crate::app::AppState;
use axum::{extract::State, Json};
use dqwatch_shared::{db::pool::health_check as db_health_check, models::user::User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database is unreachable
    pub status: String,
    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    /// Whether any identity exists in the datastore
    pub seeded: bool,
}

/// Health check handler
///
/// Never fails; a database error degrades the reported status.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            false
        }
    };

    let seeded = connected && matches!(User::count(&state.db).await, Ok(n) if n > 0);

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        seeded,
    })
}
