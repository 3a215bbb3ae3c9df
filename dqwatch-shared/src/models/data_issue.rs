/// Open and resolved data-quality issues

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::{Collection, Severity};
use crate::db::pool::DbPool;

/// Triage state of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    Investigating,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DataIssue {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub severity: Severity,

    /// Name of the data source the issue was detected in
    pub source: String,

    pub affected_records: i64,
    pub status: IssueStatus,
    pub detected_at: DateTime<Utc>,
}

impl Collection for DataIssue {
    const TABLE: &'static str = "data_issues";
    const ORDER_BY: &'static str = "detected_at DESC, id ASC";
}

impl DataIssue {
    pub async fn insert(&self, pool: &DbPool) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO data_issues
                (title, description, severity, source, affected_records, status, detected_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.severity)
        .bind(&self.source)
        .bind(self.affected_records)
        .bind(self.status)
        .bind(self.detected_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
