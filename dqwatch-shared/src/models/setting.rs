/// System settings (admin-only)
///
/// Settings are plain key/value pairs. They are read-only through the API;
/// values are changed by editing the seed or the database directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Collection;
use crate::db::pool::DbPool;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl Collection for SystemSetting {
    const TABLE: &'static str = "system_settings";
    const ORDER_BY: &'static str = "key ASC";
}

impl SystemSetting {
    /// Inserts or replaces the setting
    pub async fn upsert(&self, pool: &DbPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, description, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.key)
        .bind(&self.value)
        .bind(&self.description)
        .bind(self.updated_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
