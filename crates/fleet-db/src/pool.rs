//! PostgreSQL connection pool management
//!
//! Provides utilities for creating connection pools and applying the schema.

use fleet_core::config::DatabaseConfig;
use fleet_core::{AppError, AppResult};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Create a PostgreSQL connection pool
///
/// # Example
///
/// ```no_run
/// use fleet_core::AppConfig;
/// use fleet_db::create_pool;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::load()?;
///     let pool = create_pool(&config.database).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
        .map_err(|e| {
            warn!("Failed to create database pool: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    info!(
        "Database pool created successfully with {} max connections",
        config.max_connections
    );

    // Test the connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!("Database connection verified");

    Ok(pool)
}

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR.run(pool).await.map_err(|e| {
        warn!("Migration failed: {}", e);
        AppError::Database(format!("Failed to apply migrations: {}", e))
    })?;

    info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_pool_and_migrate() {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/fleet_rental".to_string());

        let config = DatabaseConfig {
            url,
            max_connections: 2,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 60,
            run_migrations: true,
        };

        let pool = create_pool(&config).await.unwrap();
        assert!(run_migrations(&pool).await.is_ok());
    }
}
