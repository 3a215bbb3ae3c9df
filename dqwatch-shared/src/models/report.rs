/// Periodic quality reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub period: ReportPeriod,
    pub summary: String,
    pub overall_score: f64,
    pub generated_at: DateTime<Utc>,
}

impl Collection for Report {
    const TABLE: &'static str = "reports";
    const ORDER_BY: &'static str = "generated_at DESC, id ASC";
}

impl Report {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO reports (title, period, summary, overall_score, generated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&self.title)
        .bind(self.period)
        .bind(&self.summary)
        .bind(self.overall_score)
        .bind(self.generated_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
