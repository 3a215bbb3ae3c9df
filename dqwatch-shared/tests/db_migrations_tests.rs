/// Integration tests for database migrations
///
/// Run with: cargo test --test db_migrations_tests

use dqwatch_shared::db::migrations::{get_migration_status, run_migrations};
use dqwatch_shared::db::pool::{close_pool, create_pool, DatabaseConfig};

const EXPECTED_TABLES: [&str; 11] = [
    "anomalies",
    "data_issues",
    "data_pipelines",
    "data_sources",
    "insights",
    "quality_metrics",
    "refresh_tokens",
    "reports",
    "system_settings",
    "trend_points",
    "users",
];

#[tokio::test]
async fn test_run_migrations_creates_schema() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();

    run_migrations(&pool).await.expect("Migrations failed");

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(tables, EXPECTED_TABLES);

    let status = get_migration_status(&pool).await.unwrap();
    assert!(status.applied_migrations > 0);
    assert!(status.is_up_to_date);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_role_constraint() {
    let pool = create_pool(DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, role, name, created_at) VALUES (?1, 'u', 'u@example.com', 'h', 'superuser', 'U', '2025-01-01T00:00:00Z')",
    )
    .bind(uuid::Uuid::new_v4())
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unknown roles must be rejected by the schema");

    close_pool(pool).await;
}
