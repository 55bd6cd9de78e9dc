//! Integration tests for the infrastructure components
//!
//! These tests verify that the gallery schema is created correctly and that
//! the constraints the services rely on are enforced by the store.

use common::{
    database::{DatabaseConfig, health_check, init_pool, migrate},
    error::DatabaseError,
};
use sqlx::{Row, SqlitePool};

async fn setup() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::in_memory()).await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn insert_user(pool: &SqlitePool, username: &str, email: &str) -> Result<i64, DatabaseError> {
    let row = sqlx::query(
        "INSERT INTO users (username, password_hash, email, phone, created_at)
         VALUES ($1, 'hash', $2, '555', '2026-01-01T00:00:00+00:00')
         RETURNING id",
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(DatabaseError::from_query)?;

    Ok(row.get("id"))
}

#[tokio::test]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;
    assert_eq!(tables, vec!["media", "saved_media", "users"]);

    Ok(())
}

#[tokio::test]
async fn duplicate_username_is_a_unique_violation() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;

    insert_user(&pool, "alice", "a@x.com").await?;
    let err = insert_user(&pool, "alice", "other@x.com").await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)));

    let err = insert_user(&pool, "bob", "a@x.com").await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)));

    Ok(())
}

#[tokio::test]
async fn bookmark_of_missing_media_is_a_foreign_key_violation()
-> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let user_id = insert_user(&pool, "alice", "a@x.com").await?;

    let err = sqlx::query(
        "INSERT INTO saved_media (user_id, media_id, created_at) VALUES ($1, 999, '2026-01-01T00:00:00+00:00')",
    )
    .bind(user_id)
    .execute(&pool)
    .await
    .map_err(DatabaseError::from_query)
    .unwrap_err();

    assert!(matches!(err, DatabaseError::ForeignKeyViolation(_)));
    assert!(err.is_constraint_violation());

    Ok(())
}
