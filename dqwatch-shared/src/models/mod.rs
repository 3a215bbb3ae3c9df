/// Database models for dqwatch
///
/// # Models
///
/// - `user`: identities, roles and public identity fields
/// - `refresh_token`: stored refresh-token digests (one per user)
/// - `collection`: the read-only dashboard collection trait and loader
/// - `quality_metric`, `pipeline`, `data_issue`, `data_source`, `anomaly`,
///   `trend`, `insight`, `report`: dashboard collections
/// - `setting`: admin-only system settings
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::models::collection::list_all;
/// use dqwatch_shared::models::anomaly::Anomaly;
/// use dqwatch_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let anomalies: Vec<Anomaly> = list_all(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod anomaly;
pub mod collection;
pub mod data_issue;
pub mod data_source;
pub mod insight;
pub mod pipeline;
pub mod quality_metric;
pub mod refresh_token;
pub mod report;
pub mod setting;
pub mod trend;
pub mod user;
