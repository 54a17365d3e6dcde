//! Database connection management
//!
//! The pool is created once at bootstrap and handed by reference to the
//! account store and the transfer engine. It lives as long as the
//! [`Database`] value; dropping the last clone of the pool closes it.

pub mod schema;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// PostgreSQL database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .max_lifetime(config.max_lifetime())
            .acquire_timeout(config.acquire_timeout())
            .connect(database_url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            max_lifetime_secs = config.max_lifetime_secs,
            "PostgreSQL connection pool established"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create missing tables
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        schema::init_schema(&self.pool).await
    }
}
