/// Database connection pool management
///
/// This module builds the SQLite connection pool used by every other part of
/// the system. There is exactly one datastore: a file-backed database in
/// normal operation and an in-memory one for tests.
///
/// # Example
///
/// ```no_run
/// use dqwatch_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: "sqlite://dqwatch.db?mode=rwc".to_string(),
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///
///     let row: (i64,) = sqlx::query_as("SELECT ?1")
///         .bind(42i64)
///         .fetch_one(&pool)
///         .await?;
///
///     Ok(())
/// }
/// ```

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pool type used throughout the crate
pub type DbPool = SqlitePool;

/// URL of a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration for the database connection pool
///
/// All timeouts are specified in seconds for ease of configuration from environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite://dqwatch.db?mode=rwc")
    pub url: String,

    /// Maximum number of connections in the pool
    ///
    /// Forced to 1 for in-memory databases, since every connection would
    /// otherwise open its own empty database.
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,

    /// How long a connection can remain idle before being closed (seconds)
    ///
    /// Ignored for in-memory databases.
    pub idle_timeout_seconds: Option<u64>,

    /// Maximum lifetime of a connection before forced recycling (seconds)
    ///
    /// Ignored for in-memory databases.
    pub max_lifetime_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://dqwatch.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: Some(600),
            max_lifetime_seconds: Some(1800),
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            ..Default::default()
        }
    }

    /// Whether the URL points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Creates and initializes a SQLite connection pool
///
/// This function:
/// 1. Creates a pool with the specified configuration
/// 2. Enables foreign key enforcement on every connection
/// 3. Performs a health check to verify the database answers
///
/// # Errors
///
/// Returns an error if:
/// - The database URL is invalid
/// - The database file cannot be opened or created
/// - Health check fails
pub async fn create_pool(config: DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let in_memory = config.is_in_memory();

    info!(
        max_connections = config.max_connections,
        in_memory,
        "Creating database connection pool"
    );

    let connect_options = SqliteConnectOptions::from_str(&config.url)?.foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds));

    if in_memory {
        // A single connection that is never recycled keeps the database alive
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        debug!("Using single persistent connection for in-memory database");
    } else {
        pool_options = pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections));

        if let Some(idle_timeout) = config.idle_timeout_seconds {
            pool_options = pool_options.idle_timeout(Duration::from_secs(idle_timeout));
            debug!(idle_timeout_seconds = idle_timeout, "Set idle timeout");
        }

        if let Some(max_lifetime) = config.max_lifetime_seconds {
            pool_options = pool_options.max_lifetime(Duration::from_secs(max_lifetime));
            debug!(max_lifetime_seconds = max_lifetime, "Set max lifetime");
        }
    }

    let pool = pool_options.connect_with(connect_options).await?;

    health_check(&pool).await?;

    info!("Database connection pool created successfully");
    Ok(pool)
}

/// Performs a health check on the database connection
///
/// Executes a simple query to verify the database is reachable and responding.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    debug!("Performing database health check");

    let result: (i32,) = sqlx::query_as("SELECT 1").fetch_one(pool).await?;

    if result.0 == 1 {
        debug!("Database health check passed");
        Ok(())
    } else {
        warn!("Database health check returned unexpected value: {}", result.0);
        Err(sqlx::Error::Protocol(
            "Health check returned unexpected value".into(),
        ))
    }
}

/// Gracefully closes the connection pool
///
/// Called during application shutdown so pending writes are flushed.
pub async fn close_pool(pool: DbPool) {
    info!("Closing database connection pool");
    pool.close().await;
    info!("Database connection pool closed");
}
