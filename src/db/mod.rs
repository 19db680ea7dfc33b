use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{error, info};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Open a connection pool, creating the database file if needed.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    info!("Connecting to database at {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Initialize the database schema
///
/// Every statement is `IF NOT EXISTS`, so running this against an existing
/// database is a no-op.
pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Initializing database schema...");

    for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        if let Err(e) = sqlx::query(statement).execute(pool).await {
            error!("Failed to initialize database schema: {}", e);
            return Err(e);
        }
    }

    info!("Database schema initialized successfully");
    Ok(())
}

/// Check if the user table exists
pub async fn check_db_initialized(pool: &SqlitePool) -> bool {
    let result = sqlx::query(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'users')",
    )
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => row.try_get::<bool, _>(0).unwrap_or(false),
        Err(_) => false,
    }
}

/// Fresh in-memory database with the schema applied.
///
/// A single connection that is never recycled, since every new in-memory
/// connection would see an empty database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_db(&pool).await.expect("schema");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let pool = test_pool().await;
        assert!(check_db_initialized(&pool).await);

        init_db(&pool).await.expect("second init should succeed");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["follows", "notifications", "posts", "users"]);
    }

    #[tokio::test]
    async fn test_uninitialized_database_detected() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        assert!(!check_db_initialized(&pool).await);
    }
}
