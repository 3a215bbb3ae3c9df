/// Integration tests for the database connection pool
///
/// These tests use throwaway SQLite files in the system temp directory.
/// Run with: cargo test --test db_pool_tests

use dqwatch_shared::db::migrations::run_migrations;
use dqwatch_shared::db::pool::{close_pool, create_pool, health_check, DatabaseConfig};
use std::path::PathBuf;
use uuid::Uuid;

/// Temporary database file removed on drop
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(format!("dqwatch-test-{}.db", Uuid::new_v4())),
        }
    }

    fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", self.path.display()),
            max_connections: 4,
            ..Default::default()
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

#[tokio::test]
async fn test_create_file_pool() {
    let db = TempDb::new();

    let pool = create_pool(db.config()).await.expect("Failed to create pool");
    assert!(db.path.exists(), "Database file should be created");
    assert!(health_check(&pool).await.is_ok());

    close_pool(pool).await;
}

#[tokio::test]
async fn test_create_pool_in_missing_directory() {
    let dir = std::env::temp_dir().join(format!("dqwatch-absent-{}", Uuid::new_v4()));
    let config = DatabaseConfig {
        url: format!("sqlite://{}/dqwatch.db?mode=rwc", dir.display()),
        connect_timeout_seconds: 2,
        ..Default::default()
    };

    assert!(create_pool(config).await.is_err());
}

#[tokio::test]
async fn test_missing_file_without_create_mode() {
    let path = std::env::temp_dir().join(format!("dqwatch-missing-{}.db", Uuid::new_v4()));
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rw", path.display()),
        connect_timeout_seconds: 2,
        ..Default::default()
    };

    assert!(create_pool(config).await.is_err());
}

#[tokio::test]
async fn test_data_survives_pool_restart() {
    let db = TempDb::new();

    let pool = create_pool(db.config()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    sqlx::query(
        "INSERT INTO system_settings (key, value, description, updated_at) VALUES ('k', 'v', 'd', '2025-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    close_pool(pool).await;

    let pool = create_pool(db.config()).await.unwrap();
    let value: String = sqlx::query_scalar("SELECT value FROM system_settings WHERE key = 'k'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(value, "v");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let db = TempDb::new();

    let pool = create_pool(db.config()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let orphan = sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token_hash, created_at, expires_at) VALUES (?1, 'h', '2025-01-01T00:00:00Z', '2025-01-08T00:00:00Z')",
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await;
    assert!(orphan.is_err(), "Refresh token without user should be rejected");

    close_pool(pool).await;
}

#[tokio::test]
async fn test_concurrent_queries() {
    let db = TempDb::new();
    let pool = create_pool(db.config()).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                let value: i64 = sqlx::query_scalar("SELECT ?1")
                    .bind(i as i64)
                    .fetch_one(&pool)
                    .await
                    .unwrap();
                value
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i as i64);
    }

    close_pool(pool).await;
}
