/// Daily quality trend series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

/// One day of the quality trend chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub id: i64,
    pub date: NaiveDate,
    pub overall_score: f64,
    pub completeness: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub timeliness: f64,
}

impl Collection for TrendPoint {
    const TABLE: &'static str = "trend_points";
    const ORDER_BY: &'static str = "date ASC";
}

impl TrendPoint {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO trend_points
                (date, overall_score, completeness, accuracy, consistency, timeliness)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(self.date)
        .bind(self.overall_score)
        .bind(self.completeness)
        .bind(self.accuracy)
        .bind(self.consistency)
        .bind(self.timeliness)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
