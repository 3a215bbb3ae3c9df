/// Headline quality scores (completeness, accuracy, ...)

use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

/// Traffic-light status of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Good,
    Warning,
    Critical,
}

impl MetricStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricStatus::Good => "good",
            MetricStatus::Warning => "warning",
            MetricStatus::Critical => "critical",
        }
    }
}

/// One headline quality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetric {
    pub id: i64,

    /// Dimension name, e.g. "Completeness"
    pub name: String,

    /// Score in percent (0-100)
    pub value: f64,

    /// Change against the previous period, in percentage points
    pub change: f64,

    pub status: MetricStatus,
    pub description: String,
}

impl Collection for QualityMetric {
    const TABLE: &'static str = "quality_metrics";
}

impl QualityMetric {
    /// Inserts the metric; `id` is assigned by the database
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO quality_metrics (name, value, change, status, description) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&self.name)
        .bind(self.value)
        .bind(self.change)
        .bind(self.status)
        .bind(&self.description)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
