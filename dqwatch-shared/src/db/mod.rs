/// Database layer for dqwatch
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - `migrations`: embedded schema migrations
/// - `seed`: static initial records loaded into empty tables at startup
/// - Models are in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}, seed};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::in_memory()).await?;
///     run_migrations(&pool).await?;
///     seed::seed_if_empty(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod seed;
