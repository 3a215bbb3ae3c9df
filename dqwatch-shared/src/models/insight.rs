/// Generated recommendations shown on the insights panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub impact: Impact,
    pub recommendation: String,
    pub created_at: DateTime<Utc>,
}

impl Collection for Insight {
    const TABLE: &'static str = "insights";
}

impl Insight {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO insights (title, description, category, impact, recommendation, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(&self.category)
        .bind(self.impact)
        .bind(&self.recommendation)
        .bind(self.created_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
