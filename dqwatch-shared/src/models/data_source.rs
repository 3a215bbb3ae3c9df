/// Per-source quality breakdown

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

/// Quality dimensions of one upstream data source
///
/// All scores are percentages (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: i64,
    pub name: String,

    /// Free-form source type, e.g. "database", "api", "file", "stream"
    #[serde(rename = "type")]
    pub kind: String,

    pub quality_score: f64,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timeliness: f64,
    pub record_count: i64,
    pub last_updated: DateTime<Utc>,
}

impl Collection for DataSource {
    const TABLE: &'static str = "data_sources";
}

impl DataSource {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO data_sources
                (name, kind, quality_score, completeness, accuracy, consistency, timeliness,
                 record_count, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&self.name)
        .bind(&self.kind)
        .bind(self.quality_score)
        .bind(self.completeness)
        .bind(self.accuracy)
        .bind(self.consistency)
        .bind(self.timeliness)
        .bind(self.record_count)
        .bind(self.last_updated)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
