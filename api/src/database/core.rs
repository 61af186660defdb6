use super::types::Database;
use anyhow::{Context, Result};
use sqlx::SqlitePool;

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to {}", database_url))?;
        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and applies pending migrations
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!()
            .run(&pool)
            .await
            .context("Failed to apply database migrations")?;
        Ok(Self { pool })
    }

    /// Test helper method to access the underlying pool
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
