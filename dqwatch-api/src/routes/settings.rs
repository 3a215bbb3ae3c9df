/// System settings endpoint (admin only)
///
/// ```text
/// GET /api/settings
/// Authorization: Bearer <admin token>
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use dqwatch_shared::models::{collection::list_all, setting::SystemSetting};

pub async fn list_settings(State(state): State<AppState>) -> ApiResult<Json<Vec<SystemSetting>>> {
    Ok(Json(list_all(&state.db).await?))
}
