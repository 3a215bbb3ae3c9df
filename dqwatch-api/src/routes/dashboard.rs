/// Dashboard collection endpoints
///
/// Every endpoint returns one whole collection as a JSON array, in the
/// collection's natural order. No pagination or filtering.
///
/// # Endpoints
///
/// | Path | Collection |
/// |---|---|
/// | `GET /api/dashboard/quality-metrics` | [`QualityMetric`](dqwatch_shared::models::quality_metric::QualityMetric) |
/// | `GET /api/dashboard/pipeline-status` | [`DataPipeline`](dqwatch_shared::models::pipeline::DataPipeline) |
/// | `GET /api/dashboard/data-issues` | [`DataIssue`](dqwatch_shared::models::data_issue::DataIssue) |
/// | `GET /api/dashboard/data-quality-by-source` | [`DataSource`](dqwatch_shared::models::data_source::DataSource) |
/// | `GET /api/dashboard/recent-anomalies` | [`Anomaly`](dqwatch_shared::models::anomaly::Anomaly) |
/// | `GET /api/dashboard/quality-trends` | [`TrendPoint`](dqwatch_shared::models::trend::TrendPoint) |
/// | `GET /api/dashboard/insights` | [`Insight`](dqwatch_shared::models::insight::Insight) |
/// | `GET /api/dashboard/reports` | [`Report`](dqwatch_shared::models::report::Report) |

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use dqwatch_shared::models::collection::{list_all, Collection};

/// Returns every record of `T`
pub async fn list_collection<T: Collection>(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<T>>> {
    let records = list_all::<T>(&state.db).await?;
    Ok(Json(records))
}
