/// Detected metric anomalies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::{Collection, Severity};
use crate::db::pool::DbPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: i64,
    pub metric: String,
    pub source: String,
    pub description: String,
    pub severity: Severity,
    pub expected_value: f64,
    pub actual_value: f64,

    /// Relative deviation from the expected value, in percent
    pub deviation: f64,

    pub detected_at: DateTime<Utc>,
}

impl Collection for Anomaly {
    const TABLE: &'static str = "anomalies";
    const ORDER_BY: &'static str = "detected_at DESC, id ASC";
}

impl Anomaly {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO anomalies
                (metric, source, description, severity, expected_value, actual_value, deviation,
                 detected_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&self.metric)
        .bind(&self.source)
        .bind(&self.description)
        .bind(self.severity)
        .bind(self.expected_value)
        .bind(self.actual_value)
        .bind(self.deviation)
        .bind(self.detected_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
