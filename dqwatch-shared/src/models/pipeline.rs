/// Ingestion/transformation pipelines and their last run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Healthy,
    Running,
    Warning,
    Failed,
}

/// A data pipeline as shown on the pipeline-status panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DataPipeline {
    pub id: i64,
    pub name: String,
    pub status: PipelineStatus,
    pub last_run: DateTime<Utc>,

    /// None for pipelines that are triggered manually
    pub next_run: Option<DateTime<Utc>>,

    pub records_processed: i64,
    pub duration_seconds: i64,
    pub error_count: i64,
}

impl Collection for DataPipeline {
    const TABLE: &'static str = "data_pipelines";
}

impl DataPipeline {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO data_pipelines
                (name, status, last_run, next_run, records_processed, duration_seconds, error_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&self.name)
        .bind(self.status)
        .bind(self.last_run)
        .bind(self.next_run)
        .bind(self.records_processed)
        .bind(self.duration_seconds)
        .bind(self.error_count)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
