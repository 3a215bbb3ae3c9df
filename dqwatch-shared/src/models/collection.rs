/// Read-only dashboard collections
///
/// Every dashboard entity is a flat table that is written once by the seeder
/// and read in full by the query gateway. This trait names the table so one
/// generic loader serves all of them.
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::models::collection::list_all;
/// use dqwatch_shared::models::quality_metric::QualityMetric;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let metrics: Vec<QualityMetric> = list_all(&pool).await?;
/// println!("{} metrics", metrics.len());
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::sqlite::SqliteRow;

use crate::db::pool::DbPool;

/// A table that is returned verbatim as a JSON array
pub trait Collection:
    for<'r> sqlx::FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static
{
    /// Table name
    const TABLE: &'static str;

    /// ORDER BY clause used when listing
    const ORDER_BY: &'static str = "id ASC";
}

/// Loads every record of a collection
pub async fn list_all<T: Collection>(pool: &DbPool) -> Result<Vec<T>, sqlx::Error> {
    let query = format!("SELECT * FROM {} ORDER BY {}", T::TABLE, T::ORDER_BY);
    sqlx::query_as::<_, T>(&query).fetch_all(pool).await
}

/// Counts the records of a collection
pub async fn count<T: Collection>(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let query = format!("SELECT COUNT(*) FROM {}", T::TABLE);
    let (count,): (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
    Ok(count)
}

/// Severity shared by data issues and anomalies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, serde::Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}
